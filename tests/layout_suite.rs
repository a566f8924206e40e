use ddg_node_layout::layout::{calc_rects, calc_width, smallest_radius, split_words};
use ddg_node_layout::measure::measure_label;
use ddg_node_layout::{CharTableMeasurer, LabelStyle, LayoutConfig, LayoutEngine, Rect, WordMeasurer};

const ROW_HEIGHT: f64 = 21.0;
const EPS: f64 = 1e-6;

const LABELS: [&str; 8] = [
    "api",
    "frontend",
    "very-long-service-name-with-several-words",
    "HTTP GET /customer",
    "/api/v2/accounts/{accountId}/transactions/search",
    "redis-cache-primary-us-east-1",
    "a b c d e f g h i j",
    "",
];

fn engine() -> LayoutEngine {
    LayoutEngine::with_char_table(LayoutConfig::default())
}

fn fixed_width_engine() -> LayoutEngine {
    LayoutEngine::new(
        LayoutConfig::default(),
        Box::new(|word: &str| word.chars().count() as f64 * 8.0 + 0.5),
        Box::new(|word: &str| word.chars().count() as f64 * 7.0),
    )
}

fn chosen_height(rects: &[Rect], width: f64) -> f64 {
    rects
        .iter()
        .find(|rect| rect.width == width)
        .map(|rect| rect.height)
        .expect("chosen width comes from the frontier")
}

fn min_diagonal(rects: &[Rect]) -> f64 {
    rects.iter().map(Rect::diagonal).fold(f64::INFINITY, f64::min)
}

#[test]
fn short_word_never_wraps() {
    let engine = engine();
    let rects = engine.rects(LabelStyle::Service, "api");
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].height, ROW_HEIGHT);
}

#[test]
fn long_service_name_narrows_when_wrapped() {
    let measurer = CharTableMeasurer::for_style(&LayoutConfig::default(), LabelStyle::Service);
    let lengths = measure_label(&measurer, "very-long-service-name-with-several-words");
    let one_line = calc_width(&lengths, 1, 0.0).expect("one line always fits");
    let two_lines = calc_width(&lengths, 2, 0.0).expect("two lines always fit");
    assert!(two_lines < one_line);
}

// Frontiers for uneven word widths, as (word widths, [(width, lines)]).
const UNEVEN_FRONTIERS: [(&[f64], &[(f64, usize)]); 6] = [
    (&[100.0, 1.0, 1.0, 1.0], &[(103.0, 1), (100.0, 2)]),
    (
        &[81.0, 20.0, 66.0, 138.0, 13.0, 9.0, 63.0, 8.0, 16.0, 9.0],
        &[(423.0, 1), (256.0, 2), (167.0, 3)],
    ),
    (
        &[53.0, 108.0, 89.0, 60.0, 87.0, 36.0, 13.0],
        &[(446.0, 1), (250.0, 2), (161.0, 3), (108.0, 7)],
    ),
    (
        &[45.0, 82.0, 149.0, 101.0, 80.0, 131.0],
        &[(588.0, 1), (312.0, 2), (250.0, 3), (181.0, 4), (149.0, 5)],
    ),
    (
        &[12.0, 150.0, 32.0, 30.0, 149.0, 9.0, 58.0, 5.0, 11.0, 102.0],
        &[(558.0, 1), (334.0, 2), (194.0, 3)],
    ),
    (
        &[7.5, 31.25, 18.5, 44.75, 9.25],
        &[(111.25, 1), (57.25, 2), (54.0, 3)],
    ),
];

#[test]
fn uneven_word_widths_produce_known_frontiers() {
    for (lengths, expected) in UNEVEN_FRONTIERS {
        let expected: Vec<Rect> = expected
            .iter()
            .map(|&(width, lines)| Rect::new(width, lines as f64 * ROW_HEIGHT))
            .collect();
        assert_eq!(calc_rects(lengths, ROW_HEIGHT), expected, "{lengths:?}");
    }
}

#[test]
fn infeasible_line_count_does_not_shrink_the_node() {
    // Each single-letter word measures as the matching entry of `widths`.
    let widths = [81.0, 20.0, 66.0, 138.0, 13.0, 9.0, 63.0, 8.0, 16.0, 9.0];
    let by_letter = move |word: &str| {
        let idx = word.bytes().next().map_or(0, |b| usize::from(b - b'a'));
        widths[idx]
    };
    let engine = LayoutEngine::new(LayoutConfig::default(), Box::new(by_letter), Box::new(by_letter));
    let fit = engine.calc_positioning("a b c d e f g h i j", None);
    assert_eq!(fit.svc_width, 167.0);
    assert!((fit.radius - 167.0_f64.hypot(3.0 * ROW_HEIGHT) / 2.0).abs() < EPS);
}

#[test]
fn service_only_positioning_has_no_operation_width() {
    let fit = engine().calc_positioning("svc", None);
    assert_eq!(fit.op_width, None);
    assert!(fit.radius > 0.0);
}

#[test]
fn operation_never_shrinks_the_circle() {
    for engine in [engine(), fixed_width_engine()] {
        for service in LABELS {
            let alone = engine.calc_positioning(service, None);
            for operation in LABELS.iter().filter(|op| !op.is_empty()) {
                let stacked = engine.calc_positioning(service, Some(operation));
                assert!(
                    stacked.radius + EPS >= alone.radius,
                    "{service:?} + {operation:?}: {} < {}",
                    stacked.radius,
                    alone.radius
                );
            }
        }
    }
}

#[test]
fn repeated_calls_are_bit_identical() {
    let engine = engine();
    let first = engine.calc_positioning("svc", Some("op"));
    let second = engine.calc_positioning("svc", Some("op"));
    assert_eq!(first.radius.to_bits(), second.radius.to_bits());
    assert_eq!(first, second);

    // A fresh engine recomputes the same answer.
    let fresh = self::engine().calc_positioning("svc", Some("op"));
    assert_eq!(first, fresh);
}

#[test]
fn clearing_the_cache_recomputes_the_same_fit() {
    let engine = engine();
    let before = engine.calc_positioning("customer", Some("HTTP GET /customer"));
    engine.clear_cache();
    assert_eq!(engine.cache_stats().positions, 0);
    assert_eq!(engine.calc_positioning("customer", Some("HTTP GET /customer")), before);
}

#[test]
fn word_split_follows_word_regex() {
    assert_eq!(split_words("foo-bar baz"), vec!["foo-", "bar ", "baz"]);
    let measurer = CharTableMeasurer::for_style(&LayoutConfig::default(), LabelStyle::Operation);
    let chunks = measure_label(&measurer, "foo-bar baz");
    assert_eq!(chunks.len(), 3);
    let whole = measurer.measure_word("foo-bar baz");
    assert!(chunks.iter().sum::<f64>() <= whole + EPS);
}

#[test]
fn frontiers_are_strictly_narrowing_and_bounded() {
    let engine = engine();
    for label in LABELS {
        let words = split_words(label).len();
        let rects = engine.rects(LabelStyle::Service, label);
        assert!(!rects.is_empty());
        assert!(rects.len() <= words.max(1), "{label:?}");
        for pair in rects.windows(2) {
            assert!(pair[1].width < pair[0].width, "{label:?}: {pair:?}");
            assert!(pair[1].height > pair[0].height, "{label:?}: {pair:?}");
        }
        for rect in rects.iter() {
            let lines = rect.height / ROW_HEIGHT;
            assert!((lines - lines.round()).abs() < EPS);
        }
    }
}

#[test]
fn only_the_last_frontier_entry_is_taller_than_wide() {
    let engine = engine();
    for label in LABELS {
        let rects = engine.rects(LabelStyle::Operation, label);
        for rect in &rects[..rects.len() - 1] {
            assert!(rect.height <= rect.width, "{label:?}: {rect:?}");
        }
    }
}

#[test]
fn circle_encloses_the_best_single_rect() {
    let engine = engine();
    for label in LABELS {
        let rects = engine.rects(LabelStyle::Service, label);
        let fit = engine.calc_positioning(label, None);
        assert!((2.0 * fit.radius - min_diagonal(&rects)).abs() < EPS, "{label:?}");
        let height = chosen_height(&rects, fit.svc_width);
        // Centered: the block's midpoint is the circle's center.
        assert!((fit.svc_margin_top + height / 2.0 - fit.radius).abs() < EPS);
    }
}

#[test]
fn stacked_circle_encloses_both_chosen_rects() {
    let config = LayoutConfig::default();
    for engine in [engine(), fixed_width_engine()] {
        for service in LABELS {
            for operation in LABELS.iter().filter(|op| !op.is_empty()) {
                let fit = engine.calc_positioning(service, Some(operation));
                let svc_rects = engine.rects(LabelStyle::Service, service);
                let op_rects = engine.rects(LabelStyle::Operation, operation);
                let op_width = fit.op_width.expect("stacked fit has an operation width");
                let svc_height = chosen_height(&svc_rects, fit.svc_width);
                let op_height = chosen_height(&op_rects, op_width);

                assert!(2.0 * fit.radius + EPS >= min_diagonal(&svc_rects));
                assert!(2.0 * fit.radius + EPS >= min_diagonal(&op_rects));

                // The circle's center sits `radius` below its top; corners are
                // measured from there.
                let top_dy = fit.radius - fit.svc_margin_top;
                let top = (fit.svc_width / 2.0).hypot(top_dy);
                let bottom_y = fit.svc_margin_top + svc_height + config.op_padding_top + op_height;
                let bottom = (op_width / 2.0).hypot(bottom_y - fit.radius);
                assert!(top <= fit.radius + EPS, "{service:?}/{operation:?}: {top} > {}", fit.radius);
                assert!(bottom <= fit.radius + EPS, "{service:?}/{operation:?}: {bottom} > {}", fit.radius);
            }
        }
    }
}

#[test]
fn identical_labels_center_the_stacked_block() {
    let same = |word: &str| word.chars().count() as f64 * 8.0;
    let engine = LayoutEngine::new(LayoutConfig::default(), Box::new(same), Box::new(same));
    let fit = engine.calc_positioning("checkout", Some("checkout"));
    let block = 2.0 * ROW_HEIGHT + engine.config().op_padding_top;
    assert!((fit.svc_margin_top + block / 2.0 - fit.radius).abs() < EPS);
}

#[test]
fn wrapped_rows_fit_the_chosen_rects() {
    let engine = fixed_width_engine();
    for service in LABELS {
        for operation in [None, Some("HTTP GET /customer"), Some("3 Operations")] {
            let layout = engine.label_layout(service, operation);
            let svc_rects = engine.rects(LabelStyle::Service, service);
            let svc_height = chosen_height(&svc_rects, layout.fit.svc_width);
            assert!(layout.service_lines.len() as f64 * ROW_HEIGHT <= svc_height + EPS);
            assert_eq!(layout.service_lines.concat().replace(' ', ""), service.replace(' ', ""));
            if let (Some(op), Some(width)) = (operation, layout.fit.op_width) {
                let op_rects = engine.rects(LabelStyle::Operation, op);
                let op_height = chosen_height(&op_rects, width);
                assert!(layout.operation_lines.len() as f64 * ROW_HEIGHT <= op_height + EPS);
            }
        }
    }
}

#[test]
fn empty_service_is_one_degenerate_word() {
    let engine = engine();
    let rects = engine.rects(LabelStyle::Service, "");
    assert_eq!(rects.len(), 1);
    // Only the service width correction remains.
    assert!((rects[0].width - 0.5).abs() < EPS);
    let fit = engine.calc_positioning("", None);
    assert!(fit.radius.is_finite());
}

#[test]
fn free_functions_match_the_engine() {
    let engine = fixed_width_engine();
    let config = LayoutConfig::default();
    let svc = calc_rects(&[32.5, 32.5], config.row_height());
    let op = calc_rects(&[14.0], config.row_height());
    let fit = smallest_radius(&svc, Some(&op), config.op_padding_top);
    assert_eq!(fit, engine.calc_positioning("svc-name", Some("op")));
}

#[test]
fn engine_can_be_shared_between_threads() {
    let engine = std::sync::Arc::new(engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || engine.calc_positioning("frontend", Some("HTTP GET /dispatch")))
        })
        .collect();
    let fits: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();
    assert!(fits.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(engine.cache_stats().positions, 1);
}
