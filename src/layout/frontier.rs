use super::types::Rect;

/// Narrowest box that word-wraps `lengths` into `lines` rows.
///
/// Rows are runs of consecutive words; the width of a wrapping is the width
/// of its widest row. `longest_thus_far` is the widest row already committed
/// by an enclosing call and acts as a floor for every row that follows.
///
/// The search is bounded: the first row starts at the shortest run reaching
/// the average row width and only grows while enough words remain for the
/// other rows and the row is still under half of the total.
///
/// Returns `None` when any first-row candidate leaves a remainder with no
/// words but two or more rows still to fill. One such candidate voids the
/// whole line count, even if another candidate would fit.
pub fn calc_width(lengths: &[f64], lines: usize, longest_thus_far: f64) -> Option<f64> {
    let total: f64 = lengths.iter().sum();
    if lines <= 1 {
        return Some(total);
    }
    let (&first, _) = lengths.split_first()?;

    let min_rect_width = longest_thus_far.max(total / lines as f64);
    let mut first_line = first;
    let mut i = 1;
    while i < lengths.len() && first_line + lengths[i] < min_rect_width {
        first_line += lengths[i];
        i += 1;
    }

    let mut options = vec![(first_line, i)];
    let mut last_width = first_line;
    while lengths.len() - i >= lines && last_width < total / 2.0 {
        last_width += lengths[i];
        i += 1;
        options.push((last_width, i));
    }

    options.into_iter().try_fold(f64::INFINITY, |best, (width, start)| {
        let rest = calc_width(&lengths[start..], lines - 1, longest_thus_far.max(width))?;
        Some(best.min(rest.max(width)))
    })
}

/// Builds the frontier of useful wrappings for one label.
///
/// Line counts are tried from one upward. A wrapping only joins the frontier
/// when it is strictly narrower than the last one kept, and the search stops
/// at the first wrapping that is taller than it is wide. Line counts with no
/// feasible wrapping are skipped without ending the search.
pub fn calc_rects(lengths: &[f64], row_height: f64) -> Vec<Rect> {
    let mut rects: Vec<Rect> = Vec::new();
    for lines in 1..=lengths.len().max(1) {
        let Some(width) = calc_width(lengths, lines, 0.0) else {
            continue;
        };
        let height = lines as f64 * row_height;
        if rects.last().is_none_or(|last| width < last.width) {
            rects.push(Rect::new(width, height));
        }
        if height > width {
            break;
        }
    }
    tracing::trace!(words = lengths.len(), rects = rects.len(), "computed label frontier");
    rects
}
