//! Page-size planning from a complexity estimate.

/// Picks a page size that keeps requests under the complexity `budget`.
///
/// * cheap result sets (`complexity * total_pages < budget`) get
///   `ceil(budget / complexity / total_pages)` items per page
/// * expensive ones get `floor(complexity * total_pages / budget)`
///
/// Zero inputs are treated as 1 and the result is never below 1.
pub fn plan(complexity: u64, total_pages: u32, budget: u64) -> u32 {
    let complexity = complexity.max(1);
    let total_pages = u64::from(total_pages.max(1));
    let budget = budget.max(1);
    let total_complexity = complexity.saturating_mul(total_pages);

    log::debug!(
        "Calculating optimal page size: complexity [{}], total pages [{}], total complexity [{}]",
        complexity,
        total_pages,
        total_complexity
    );

    let per_page = if total_complexity < budget {
        budget.div_ceil(total_complexity)
    } else {
        total_complexity / budget
    };

    u32::try_from(per_page).unwrap_or(u32::MAX).max(1)
}
