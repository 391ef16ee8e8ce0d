//! Applying suggested replacements to source text

use crate::models::Fix;

/// Apply fixes to `source`, returning the new text and how many were applied.
///
/// Fixes are applied in source order. A fix that overlaps one already taken
/// is skipped; this happens for nested loops, where the outer replacement
/// already contains the inner loop verbatim. A second run picks it up.
pub fn apply_fixes(source: &str, fixes: &[&Fix]) -> (String, usize) {
    let mut ordered: Vec<&Fix> = fixes.to_vec();
    ordered.sort_by_key(|f| (f.start, std::cmp::Reverse(f.end)));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut applied = 0;

    for fix in ordered {
        if fix.start < cursor || !is_valid_range(source, fix) {
            log::debug!(
                "Skipping fix at {}..{}: overlaps a previous fix or is out of range",
                fix.start,
                fix.end
            );
            continue;
        }
        out.push_str(&source[cursor..fix.start]);
        out.push_str(&fix.replacement);
        cursor = fix.end;
        applied += 1;
    }
    out.push_str(&source[cursor..]);

    (out, applied)
}

fn is_valid_range(source: &str, fix: &Fix) -> bool {
    fix.start <= fix.end
        && fix.end <= source.len()
        && source.is_char_boundary(fix.start)
        && source.is_char_boundary(fix.end)
}
