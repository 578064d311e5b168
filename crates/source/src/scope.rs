// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use metricache_domain::{
    CapacityEntry, EntityPeriodKey, HoursLine, InvoiceRecord, PeriodKey, SalesOrderRecord,
};

/// Server-side filter a record source applies before paging.
///
/// Mirrors the date (and employee) domain an ERP query is issued with. The
/// aggregators repeat the check, so a looser filter is still correct.
pub trait InScope<K> {
    /// Whether the record belongs to `key`.
    fn in_scope(&self, key: &K) -> bool;
}

impl InScope<PeriodKey> for InvoiceRecord {
    fn in_scope(&self, key: &PeriodKey) -> bool {
        key.contains(self.date)
    }
}

impl InScope<PeriodKey> for HoursLine {
    fn in_scope(&self, key: &PeriodKey) -> bool {
        key.contains(self.date)
    }
}

impl InScope<PeriodKey> for SalesOrderRecord {
    fn in_scope(&self, key: &PeriodKey) -> bool {
        key.contains(self.date)
    }
}

impl InScope<EntityPeriodKey> for CapacityEntry {
    fn in_scope(&self, key: &EntityPeriodKey) -> bool {
        self.employee_id == key.entity_id() && key.period().contains(self.date)
    }
}
