//! Share stage.
//!
//! `share = round_half_even(group / grand_total * 100)`. A zero grand total
//! yields 0 for every group.

/// Percentage share of `part` in `grand_total`, rounded half to even.
pub fn share_percent(part: f64, grand_total: f64) -> i64 {
    if grand_total == 0.0 || !grand_total.is_finite() {
        return 0;
    }
    let share = (part / grand_total * 100.0).round_ties_even();
    if share.is_finite() {
        share as i64
    } else {
        0
    }
}
