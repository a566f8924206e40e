use super::types::{CircleFit, Rect};

/// Smallest circle around the service label, or around the service label
/// stacked above the operation label with `op_padding_top` between them.
///
/// Every pairing of frontier rects is tried, service rects in the outer loop
/// and operation rects in the inner one; the first pairing reaching the
/// minimum radius wins.
///
/// # Panics
///
/// Panics when either frontier is empty; `calc_rects` never produces one.
pub fn smallest_radius(svc_rects: &[Rect], op_rects: Option<&[Rect]>, op_padding_top: f64) -> CircleFit {
    let Some(op_rects) = op_rects else {
        return smallest_single(svc_rects);
    };

    let mut best: Option<CircleFit> = None;
    for svc in svc_rects {
        for op in op_rects {
            let fit = fit_stacked(svc, op, op_padding_top);
            if best.is_none_or(|b| b.radius > fit.radius) {
                best = Some(fit);
            }
        }
    }
    best.expect("label frontiers must not be empty")
}

fn smallest_single(svc_rects: &[Rect]) -> CircleFit {
    let (first, rest) = svc_rects
        .split_first()
        .expect("label frontiers must not be empty");
    let mut min_diagonal = first.diagonal();
    let mut chosen = first;
    for rect in rest {
        let diagonal = rect.diagonal();
        if diagonal < min_diagonal {
            min_diagonal = diagonal;
            chosen = rect;
        }
    }

    CircleFit {
        radius: min_diagonal / 2.0,
        svc_width: chosen.width,
        op_width: None,
        svc_margin_top: (min_diagonal - chosen.height) / 2.0,
    }
}

fn fit_stacked(svc: &Rect, op: &Rect, op_padding_top: f64) -> CircleFit {
    let total_height = svc.height + op.height + op_padding_top;
    // Height above the bottom of the operation rect at which its lower
    // corners and the service rect's upper corners are equally far away.
    let cy = (sq(svc.width / 2.0) - sq(op.width / 2.0)) / (2.0 * total_height) + total_height / 2.0;

    let (radius, svc_margin_top) = if cy < op.height / 2.0 {
        let radius = op.diagonal() / 2.0;
        (radius, radius - op_padding_top - op.height / 2.0 - svc.height)
    } else if cy > total_height - svc.height / 2.0 {
        let radius = svc.diagonal() / 2.0;
        (radius, radius - svc.height / 2.0)
    } else {
        let radius = (sq(op.width / 2.0) + sq(cy)).sqrt();
        (radius, radius - total_height + cy)
    };

    CircleFit {
        radius,
        svc_width: svc.width,
        op_width: Some(op.width),
        svc_margin_top,
    }
}

fn sq(n: f64) -> f64 {
    n * n
}
