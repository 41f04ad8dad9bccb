extern crate scatter_spline;

use rand::Rng;
use scatter_spline::{build_smoother, Sample};

fn main() {

    let x_min = 0.0;
    let x_max = 6.0;
    let mut rng = rand::thread_rng();

    let number_of_samples = 80;
    let data: Vec<Sample> = (0..number_of_samples)
        .map(|i| {
            let x = x_min + (x_max - x_min) * i as f64 / (number_of_samples - 1) as f64;
            Sample::new(x, x.sin() + rng.gen_range(-0.3..0.3))
        })
        .collect();

    let basis_points: Vec<f64> = (0..=12).map(|i| x_min + 0.5 * i as f64).collect();
    let smoother = build_smoother(data.clone(), &basis_points).unwrap();

    let lambdas = [1e-6, 1e-3, 1e-1];
    let splines: Vec<_> = lambdas.iter().map(|l| smoother.fit(*l).unwrap()).collect();

    for spline in splines.iter() {
        println!("lambda {:e}: roughness {:.4}", spline.lambda(), spline.roughness());
    }

    println!("x;y;fit_1e-6;fit_1e-3;fit_1e-1");
    for sample in data.iter() {
        let fits: Vec<String> = splines
            .iter()
            .map(|s| format!("{:.3}", s.evaluate(sample.get_x())))
            .collect();
        println!("{:.2};{:.3};{}", sample.get_x(), sample.get_y(), fits.join(";"));
    }
}
