//! Drawable-primitive synthesis for `discrete-plot` and `continuous-plot`.
//!
//! Both plots normalize their data into a 20x20 logical canvas. Screen
//! coordinates negate the data y axis, so the smallest data ordinate maps to
//! the largest (bottom-most) screen ordinate. Every emitted primitive is a
//! plain Expression tagged through its property map with an `"object-name"`
//! of `point`, `line` or `text` plus kind-specific attributes.

use crate::error::SemanticError;
use crate::expression::Expression;
use crate::interrupt::InterruptFlag;

const CANVAS_UNITS: f64 = 20.0;
const SAMPLE_INTERVALS: usize = 50;
const REFINE_PASSES: usize = 10;
// turning angles below this many radians trigger adaptive bisection
const TURN_THRESHOLD: f64 = 3.05433;
const VERTICAL_TEXT_ROTATION: f64 = 1.5708;

/// Numeric head of a coordinate slot, with non-numbers reading as zero.
fn coord(exp: &Expression) -> f64 {
    exp.head().as_number().unwrap_or(0.0)
}

pub(crate) fn point(x: f64, y: f64) -> Expression {
    let mut point = Expression::list(vec![Expression::number(x), Expression::number(y)]);
    point.set_property("object-name", Expression::symbol("point"));
    point
}

pub(crate) fn sized_point(x: f64, y: f64, size: f64) -> Expression {
    let mut point = point(x, y);
    point.set_property("size", Expression::number(size));
    point
}

pub(crate) fn line(from: Expression, to: Expression) -> Expression {
    let mut line = Expression::list(vec![from, to]);
    line.set_property("object-name", Expression::symbol("line"));
    line
}

pub(crate) fn thick_line(from: Expression, to: Expression, thickness: f64) -> Expression {
    let mut line = line(from, to);
    line.set_property("thickness", Expression::number(thickness));
    line
}

fn text(content: &str, position: Expression, scale: f64) -> Expression {
    let mut text = Expression::string(content);
    text.set_property("object-name", Expression::symbol("text"));
    text.set_property("position", position);
    text.set_property("text-scale", Expression::number(scale));
    text
}

// continuous-plot builds its primitives with explicit zero defaults
fn curve_point(x: f64, y: f64) -> Expression {
    sized_point(x, y, 0.0)
}

fn curve_line(from: Expression, to: Expression) -> Expression {
    thick_line(from, to, 0.0)
}

/// Axis tick label text: the value rendered to two significant digits, with
/// scientific notation once the magnitude leaves the `%g` fixed range.
fn format_tick(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf".to_string() } else { "inf".to_string() };
    }

    // round to two significant digits first; the rounded value decides the notation
    let rounded = format!("{value:.1e}").parse::<f64>().unwrap_or(value);
    let exponent = rounded.abs().log10().floor() as i32;
    if !(-4..2).contains(&exponent) {
        let mantissa = format!("{:.1}", rounded / 10f64.powi(exponent));
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (1 - exponent).max(0) as usize;
        let fixed = format!("{rounded:.decimals$}");
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    }
}

/// The four border lines of the bounding box, then a vertical axis line when
/// x spans zero and a horizontal axis line when the flipped y range spans
/// zero. `min_y` and `max_y` are screen coordinates, so `min_y` is the
/// bottom edge and numerically the larger of the two.
fn box_lines(
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    mk_point: fn(f64, f64) -> Expression,
    mk_line: fn(Expression, Expression) -> Expression,
) -> Vec<Expression> {
    let top_left = mk_point(min_x, max_y);
    let bottom_left = mk_point(min_x, min_y);
    let top_right = mk_point(max_x, max_y);
    let bottom_right = mk_point(max_x, min_y);

    let mut lines = vec![
        mk_line(top_left.clone(), bottom_left.clone()),
        mk_line(top_left, top_right.clone()),
        mk_line(bottom_left, bottom_right.clone()),
        mk_line(bottom_right, top_right),
    ];
    if min_x <= 0.0 && max_x >= 0.0 {
        lines.push(mk_line(mk_point(0.0, max_y), mk_point(0.0, min_y)));
    }
    if min_y >= 0.0 && max_y <= 0.0 {
        lines.push(mk_line(mk_point(min_x, 0.0), mk_point(max_x, 0.0)));
    }
    lines
}

/// Scan the option list for a numeric `"text-scale"` entry; the last one wins.
fn text_scale_of(options: &Expression) -> f64 {
    let mut scale = 1.0;
    for entry in options.tail() {
        let key = entry.tail().first().and_then(|e| e.head().as_string());
        let value = entry.tail().get(1).and_then(|e| e.head().as_number());
        if let (Some("text-scale"), Some(value)) = (key, value) {
            scale = value;
        }
    }
    scale
}

/// Emit title / abscissa-label / ordinate-label texts in option order.
/// Processing stops at the first entry whose key is not one of the three
/// (this is how a trailing `"text-scale"` entry terminates the scan);
/// a non-list entry or a non-string key fails.
fn option_texts(
    options: &Expression,
    scale: f64,
    s_min_x: f64,
    s_min_y: f64,
    s_max_y: f64,
    mk_point: fn(f64, f64) -> Expression,
) -> Result<Vec<Expression>, SemanticError> {
    let mut texts = Vec::new();
    for entry in options.tail() {
        let key = match (entry.is_list(), entry.tail().first().and_then(|e| e.head().as_string())) {
            (true, Some(key)) => key,
            _ => {
                return Err(SemanticError::new(
                    "Error in call to discrete-plot: second list must contain only string options.",
                ))
            }
        };
        let value = entry.tail().get(1).and_then(|e| e.head().as_string());
        let emitted = match (key, value) {
            ("title", Some(value)) => Some(text(value, mk_point(0.0, s_max_y - 3.0), scale)),
            ("abscissa-label", Some(value)) => {
                Some(text(value, mk_point(0.0, s_min_y + 3.0), scale))
            }
            ("ordinate-label", Some(value)) => {
                let mut label = text(value, mk_point(s_min_x - 3.0, s_min_y - 10.0), scale);
                label.set_property(
                    "text-rotation",
                    Expression::number(VERTICAL_TEXT_ROTATION),
                );
                Some(label)
            }
            _ => None,
        };
        match emitted {
            Some(label) => texts.push(label),
            None => break,
        }
    }
    Ok(texts)
}

/// The `discrete-plot` builtin: a list of 2-element coordinate lists plus an
/// option list, turned into scaled lollipop points and stem lines, four tick
/// labels, the option texts and finally the bounding box.
pub(crate) fn discrete_plot(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    let (data, options) = match args {
        [data, options] if data.is_list() && options.is_list() => (data, options),
        [_, _] => {
            return Err(SemanticError::new(
                "Error in call to discrete plot: both arguments must be lists.",
            ))
        }
        _ => {
            return Err(SemanticError::new(
                "Error in call to discrete plot: invalid number of arguments.",
            ))
        }
    };

    let scale = text_scale_of(options);

    let mut min_x = 10000.0f64;
    let mut max_x = -10000.0f64;
    let mut min_y = 10000.0f64;
    let mut max_y = -100000.0f64;
    for entry in data.tail() {
        let x = entry.tail().first().map(coord).unwrap_or(0.0);
        let y = entry.tail().get(1).map(coord).unwrap_or(0.0);
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let scaled_x = CANVAS_UNITS / (max_x - min_x);
    let scaled_y = CANVAS_UNITS / (max_y - min_y);
    let s_min_x = min_x * scaled_x;
    let s_max_x = max_x * scaled_x;
    let s_min_y = min_y * -scaled_y;
    let s_max_y = max_y * -scaled_y;

    let mut items = Vec::new();
    for entry in data.tail() {
        if !(entry.is_list() && entry.tail().len() == 2) {
            return Err(SemanticError::new(
                "Error in call to discrete plot: first list must consist of coordinates.",
            ));
        }
        let x = coord(&entry.tail()[0]) * scaled_x;
        let y = coord(&entry.tail()[1]) * -scaled_y;
        let lollipop = sized_point(x, y, 0.5);
        let stem_base = if s_min_y > 0.0 { 0.0 } else { s_min_y };
        let stem = line(point(x, stem_base), lollipop.clone());
        items.push(lollipop);
        items.push(stem);
    }

    items.push(text(&format_tick(max_y), point(s_min_x - 2.0, s_max_y), scale));
    items.push(text(&format_tick(min_y), point(s_min_x - 2.0, s_min_y), scale));
    items.push(text(&format_tick(min_x), point(s_min_x, s_min_y + 2.0), scale));
    items.push(text(&format_tick(max_x), point(s_max_x, s_min_y + 2.0), scale));

    items.extend(option_texts(options, scale, s_min_x, s_min_y, s_max_y, point)?);
    items.extend(box_lines(s_min_x, s_max_x, s_min_y, s_max_y, point, line));

    Ok(Expression::list(items))
}

/// True when the corner at `b` turns more sharply than the refinement
/// threshold allows. Collinear points give an angle of pi and no split.
fn sharp_turn(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let (ax, ay) = (a.0 - b.0, a.1 - b.1);
    let (bx, by) = (c.0 - b.0, c.1 - b.1);
    let angle = ((ax * bx + ay * by)
        / (ax * ax + ay * ay).sqrt()
        / (bx * bx + by * by).sqrt())
    .acos();
    angle < TURN_THRESHOLD
}

/// The `continuous-plot` drawing pass. `sample` evaluates the plotted
/// function at one abscissa; the caller owns closure invocation. Emits the
/// tick labels, bounding box and option texts, then the refined curve as
/// line segments followed by the sample points themselves.
pub(crate) fn continuous_plot(
    interrupt: &InterruptFlag,
    sample: &mut dyn FnMut(f64) -> Result<f64, SemanticError>,
    low: f64,
    high: f64,
    options: Option<&Expression>,
) -> Result<Expression, SemanticError> {
    let scale = options.map(text_scale_of).unwrap_or(1.0);

    let span = high - low;
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(SAMPLE_INTERVALS + 1);
    for i in 0..=SAMPLE_INTERVALS {
        if interrupt.is_raised() {
            return Err(SemanticError::Interrupted);
        }
        let x = low + span * (i as f64) / (SAMPLE_INTERVALS as f64);
        points.push((x, sample(x)?));
    }

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in &points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let (min_x, max_x) = (low, high);

    let scaled_x = CANVAS_UNITS / (max_x - min_x);
    let scaled_y = CANVAS_UNITS / (max_y - min_y);
    let s_min_x = min_x * scaled_x;
    let s_max_x = max_x * scaled_x;
    let s_min_y = min_y * -scaled_y;
    let s_max_y = max_y * -scaled_y;

    let mut items = Vec::new();
    items.push(text(&format_tick(min_y), curve_point(s_min_x - 2.0, s_min_y), scale));
    items.push(text(&format_tick(max_y), curve_point(s_min_x - 2.0, s_max_y), scale));
    items.push(text(&format_tick(min_x), curve_point(s_min_x, s_min_y + 2.0), scale));
    items.push(text(&format_tick(max_x), curve_point(s_max_x, s_min_y + 2.0), scale));

    items.extend(box_lines(s_min_x, s_max_x, s_min_y, s_max_y, curve_point, curve_line));

    if let Some(options) = options {
        items.extend(option_texts(options, scale, s_min_x, s_min_y, s_max_y, curve_point)?);
    }

    for _ in 0..REFINE_PASSES {
        if points.len() < 3 {
            break;
        }
        let mut split_after = vec![false; points.len() - 1];
        let mut any_split = false;
        for j in 0..points.len() - 2 {
            if sharp_turn(points[j], points[j + 1], points[j + 2]) {
                split_after[j] = true;
                split_after[j + 1] = true;
                any_split = true;
            }
        }
        if !any_split {
            break;
        }
        let mut refined = Vec::with_capacity(points.len() * 2);
        for (i, &p) in points.iter().enumerate() {
            refined.push(p);
            if i < split_after.len() && split_after[i] {
                if interrupt.is_raised() {
                    return Err(SemanticError::Interrupted);
                }
                let mid = (p.0 + points[i + 1].0) / 2.0;
                refined.push((mid, sample(mid)?));
            }
        }
        points = refined;
    }

    let scaled: Vec<Expression> = points
        .iter()
        .map(|&(x, y)| curve_point(x * scaled_x, y * -scaled_y))
        .collect();
    for pair in scaled.windows(2) {
        items.push(curve_line(pair[0].clone(), pair[1].clone()));
    }
    items.extend(scaled);

    Ok(Expression::list(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> InterruptFlag {
        InterruptFlag::new()
    }

    #[test]
    fn tick_labels_use_two_significant_digits() {
        assert_eq!(format_tick(1.0), "1");
        assert_eq!(format_tick(-3.0), "-3");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(0.123), "0.12");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(150.0), "1.5e+02");
        assert_eq!(format_tick(100.0), "1e+02");
        assert_eq!(format_tick(0.00009), "9e-05");
    }

    #[test]
    fn box_emits_axis_lines_only_when_ranges_span_zero() {
        let spanning = box_lines(-10.0, 10.0, 10.0, -10.0, point, line);
        assert_eq!(spanning.len(), 6);

        let offset = box_lines(5.0, 10.0, -2.0, -10.0, point, line);
        assert_eq!(offset.len(), 4);
    }

    #[test]
    fn straight_runs_are_not_split() {
        assert!(!sharp_turn((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)));
        assert!(sharp_turn((0.0, 0.0), (1.0, 0.0), (1.0, 5.0)));
    }

    #[test]
    fn discrete_plot_produces_seventeen_primitives_for_two_points() {
        let data = Expression::list(vec![
            Expression::list(vec![Expression::number(-1.0), Expression::number(-1.0)]),
            Expression::list(vec![Expression::number(1.0), Expression::number(1.0)]),
        ]);
        let options = Expression::list(vec![
            Expression::list(vec![
                Expression::string("title"),
                Expression::string("The Title"),
            ]),
            Expression::list(vec![
                Expression::string("abscissa-label"),
                Expression::string("X Label"),
            ]),
            Expression::list(vec![
                Expression::string("ordinate-label"),
                Expression::string("Y Label"),
            ]),
        ]);

        let plot = discrete_plot(&flag(), &[data, options]).unwrap();
        assert!(plot.is_list());
        assert_eq!(plot.tail().len(), 17);

        let first = &plot.tail()[0];
        match first.property("object-name") {
            Some(name) => assert_eq!(*name, Expression::symbol("point")),
            None => panic!("expected data point to carry an object-name"),
        }
        assert_eq!(
            first.property("size"),
            Some(&Expression::number(0.5))
        );
    }

    #[test]
    fn discrete_plot_rejects_malformed_coordinates() {
        let data = Expression::list(vec![Expression::number(1.0)]);
        let options = Expression::list(vec![]);
        let err = discrete_plot(&flag(), &[data, options]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in call to discrete plot: first list must consist of coordinates."
        );
    }

    #[test]
    fn option_scan_stops_at_first_unrecognized_key() {
        let data = Expression::list(vec![
            Expression::list(vec![Expression::number(0.0), Expression::number(0.0)]),
            Expression::list(vec![Expression::number(1.0), Expression::number(1.0)]),
        ]);
        let options = Expression::list(vec![
            Expression::list(vec![
                Expression::string("text-scale"),
                Expression::number(2.0),
            ]),
            Expression::list(vec![
                Expression::string("title"),
                Expression::string("unreachable"),
            ]),
        ]);

        let plot = discrete_plot(&flag(), &[data, options]).unwrap();
        // 4 lollipop items + 4 ticks + 0 option texts + 6 box lines
        assert_eq!(plot.tail().len(), 14);
    }

    #[test]
    fn continuous_plot_emits_lines_and_points_for_a_line() {
        let mut sample = |x: f64| -> Result<f64, SemanticError> { Ok(x) };
        let plot = continuous_plot(&flag(), &mut sample, -1.0, 1.0, None).unwrap();
        assert!(plot.is_list());
        // 4 ticks + 6 box lines + 50 segments + 51 points, no refinement
        assert_eq!(plot.tail().len(), 111);
    }

    #[test]
    fn continuous_plot_aborts_when_its_flag_is_raised() {
        let interrupt = flag();
        interrupt.raise();
        let mut sample = |x: f64| -> Result<f64, SemanticError> { Ok(x) };
        let err = continuous_plot(&interrupt, &mut sample, -1.0, 1.0, None).unwrap_err();
        assert!(matches!(err, SemanticError::Interrupted));
    }
}
