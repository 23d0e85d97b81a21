//! Structural tests over the drawable-primitive trees produced by
//! discrete-plot and continuous-plot.

use plotscript::{Expression, Interpreter};

fn run(program: &str) -> Expression {
    match Interpreter::new().run(program) {
        Ok(result) => result,
        Err(err) => panic!("expected {program:?} to evaluate, got {err}"),
    }
}

fn count_kind(plot: &Expression, kind: &str) -> usize {
    plot.tail()
        .iter()
        .filter(|item| item.property("object-name") == Some(&Expression::symbol(kind)))
        .count()
}

const TWO_POINT_PLOT: &str = concat!(
    "(discrete-plot (list (list -1 -1) (list 1 1))",
    " (list (list \"title\" \"The Title\")",
    " (list \"abscissa-label\" \"X Label\")",
    " (list \"ordinate-label\" \"Y Label\")))"
);

#[test]
fn two_point_discrete_plot_has_seventeen_primitives() {
    let plot = run(TWO_POINT_PLOT);
    assert!(plot.is_list());
    assert_eq!(plot.tail().len(), 17);
    assert_eq!(count_kind(&plot, "point"), 2);
    assert_eq!(count_kind(&plot, "line"), 8);
    assert_eq!(count_kind(&plot, "text"), 7);
}

#[test]
fn discrete_plot_scales_data_onto_the_canvas() {
    let plot = run(TWO_POINT_PLOT);

    // data (-1,-1) lands at (-10, 10): x scaled by 20/2, y negated
    let first_point = &plot.tail()[0];
    assert_eq!(
        *first_point,
        Expression::list(vec![Expression::number(-10.0), Expression::number(10.0)])
    );
    assert_eq!(first_point.property("size"), Some(&Expression::number(0.5)));

    // its stem runs to the y = 0 axis
    let stem = &plot.tail()[1];
    assert_eq!(stem.property("object-name"), Some(&Expression::symbol("line")));
    assert_eq!(
        stem.tail()[0],
        Expression::list(vec![Expression::number(-10.0), Expression::number(0.0)])
    );
}

#[test]
fn discrete_plot_tick_labels_use_two_significant_digits() {
    let plot = run(TWO_POINT_PLOT);
    let texts: Vec<&str> = plot
        .tail()
        .iter()
        .filter(|item| {
            item.property("object-name") == Some(&Expression::symbol("text"))
        })
        .filter_map(|item| item.head().as_string())
        .collect();
    // 4 tick labels then the 3 option labels, in emission order
    assert_eq!(
        texts,
        vec!["1", "-1", "-1", "1", "The Title", "X Label", "Y Label"]
    );
}

#[test]
fn ordinate_label_is_rotated_vertically() {
    let plot = run(TWO_POINT_PLOT);
    let rotated: Vec<&Expression> = plot
        .tail()
        .iter()
        .filter(|item| item.property("text-rotation").is_some())
        .collect();
    assert_eq!(rotated.len(), 1);
    assert_eq!(rotated[0].head(), &plotscript::Atom::string("Y Label"));
    assert_eq!(
        rotated[0].property("text-rotation"),
        Some(&Expression::number(1.5708))
    );
}

#[test]
fn nine_point_discrete_plot_has_thirty_one_primitives() {
    let plot = run(concat!(
        "(begin",
        " (define f (lambda (x) (list x (+ (* 2 x) 1))))",
        " (discrete-plot (map f (range -2 2 0.5))",
        " (list (list \"title\" \"The Data\")",
        " (list \"abscissa-label\" \"X Label\")",
        " (list \"ordinate-label\" \"Y Label\")",
        " (list \"text-scale\" 1))))"
    ));
    assert!(plot.is_list());
    assert_eq!(plot.tail().len(), 31);
    assert_eq!(count_kind(&plot, "point"), 9);
    assert_eq!(count_kind(&plot, "line"), 15);
    assert_eq!(count_kind(&plot, "text"), 7);
}

#[test]
fn text_scale_option_reaches_every_label() {
    let plot = run(concat!(
        "(discrete-plot (list (list 0 0) (list 4 4))",
        " (list (list \"title\" \"scaled\") (list \"text-scale\" 2)))"
    ));
    for item in plot.tail() {
        if item.property("object-name") == Some(&Expression::symbol("text")) {
            assert_eq!(item.property("text-scale"), Some(&Expression::number(2.0)));
        }
    }
}

#[test]
fn discrete_plot_rejects_non_list_arguments() {
    let err = Interpreter::new()
        .run("(discrete-plot 1 2)")
        .expect_err("non-list arguments fail");
    assert_eq!(
        err,
        "Error in call to discrete plot: both arguments must be lists."
    );
}

#[test]
fn continuous_plot_samples_fifty_one_points_for_a_line() {
    // a straight line triggers no refinement
    let plot = run("(continuous-plot (lambda (x) (+ x 1)) (list -2 2))");
    assert!(plot.is_list());
    assert_eq!(count_kind(&plot, "point"), 51);
    // 6 box/axis lines plus one segment per consecutive sample pair
    assert_eq!(count_kind(&plot, "line"), 6 + 50);
    assert_eq!(count_kind(&plot, "text"), 4);
}

#[test]
fn continuous_plot_refines_sharp_curves() {
    let plot = run("(continuous-plot (lambda (x) (sin x)) (list (- pi) pi))");
    let points = count_kind(&plot, "point");
    assert!(points > 51, "refinement should add samples, found {points}");
    assert_eq!(count_kind(&plot, "line"), 6 + points - 1);
}

#[test]
fn continuous_plot_curve_primitives_use_zero_defaults() {
    let plot = run("(continuous-plot (lambda (x) (+ x 1)) (list 1 2))");
    for item in plot.tail() {
        match item.property("object-name") {
            Some(kind) if *kind == Expression::symbol("point") => {
                assert_eq!(item.property("size"), Some(&Expression::number(0.0)));
            }
            Some(kind) if *kind == Expression::symbol("line") => {
                assert_eq!(item.property("thickness"), Some(&Expression::number(0.0)));
            }
            _ => {}
        }
    }
}

#[test]
fn continuous_plot_accepts_an_option_list() {
    let plot = run(concat!(
        "(continuous-plot (lambda (x) (+ x 1)) (list -2 2)",
        " (list (list \"title\" \"A Line\")))"
    ));
    let titles: Vec<&str> = plot
        .tail()
        .iter()
        .filter_map(|item| item.head().as_string())
        .collect();
    assert!(titles.contains(&"A Line"));
}
