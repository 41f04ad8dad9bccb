extern crate scatter_spline;

use scatter_spline::{compute_coefficients, evaluate, BoundaryCondition};

fn main() {

    let x_values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let y_values = vec![0.0, 2.0, 1.0, -1.0, 0.5, 0.0];

    let boundary_conditions = [
        BoundaryCondition::Natural,
        BoundaryCondition::Periodic,
        BoundaryCondition::Parabolic,
        BoundaryCondition::NotAKnot,
        BoundaryCondition::Quadratic,
    ];

    let coefficients: Vec<Vec<f64>> = boundary_conditions
        .iter()
        .map(|bc| compute_coefficients(*bc, &x_values, &y_values).unwrap())
        .collect();

    let number_of_steps = 50;
    let step = 5.0 / number_of_steps as f64;

    println!("x;natural;periodic;parabolic;not_a_knot;quadratic");
    for i in 0..=number_of_steps {
        let x = step * i as f64;
        let row: Vec<String> = coefficients
            .iter()
            .map(|c| format!("{:.3}", evaluate(c, &x_values, x).unwrap()))
            .collect();
        println!("{:.2};{}", x, row.join(";"));
    }

    match compute_coefficients(BoundaryCondition::Clamped, &x_values, &y_values) {
        Ok(_) => println!("clamped: unexpected success"),
        Err(error) => println!("clamped: {}", error),
    }
}
