extern crate scatter_spline;

use scatter_spline::{get_slopes, HermiteInterpolant};

fn main() {

    let x_data = vec![0.0, 1.0, 2.0, 4.0, 5.0, 6.0];
    let y_data = vec![1.0, -1.0, 0.0, 3.0, 1.0, 1.0];

    let slopes = get_slopes(&x_data, &y_data).unwrap();
    println!("slopes: {:?}", slopes);

    let interpolant = HermiteInterpolant::new(&x_data, &y_data, &slopes).unwrap();

    let number_of_steps = 60;
    let step = 6.0 / number_of_steps as f64;

    println!("x;y");
    for i in 0..=number_of_steps {
        let x = step * i as f64;
        println!("{:.2};{:.2}", x, interpolant.interpolate(x.min(6.0)).unwrap());
    }
}
