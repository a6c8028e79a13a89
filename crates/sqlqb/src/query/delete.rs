//! DELETE compilation.

use super::Query;
use crate::error::QbResult;
use crate::fragment::Fragment;

impl Query {
    pub(super) fn compile_delete(&self) -> QbResult<Fragment> {
        let mut f = Fragment::raw("DELETE FROM ");
        self.push_table(&mut f, "DELETE")?;
        self.check_single_table()?;

        self.push_where(&mut f)?;
        self.push_mutation_tail(&mut f)?;
        Ok(f)
    }
}
