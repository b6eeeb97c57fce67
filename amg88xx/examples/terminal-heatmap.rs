use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::Context;
use linux_embedded_hal::{Delay, I2cdev};

use amg88xx::{convert_to_heatmap, Amg88xx, Rgb, TemperatureRange, PIXEL_COUNT, WIDTH};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let bus_path = match args.len() {
        1 => "/dev/i2c-1",
        2 => args[1].as_str(),
        _ => anyhow::bail!("At most one argument is accepted: [I2C bus]"),
    };
    let bus = I2cdev::new(Path::new(bus_path))
        .with_context(|| format!("Unable to open {}", bus_path))?;
    let mut sensor = Amg88xx::new(bus);
    let mut delay = Delay;
    // Keep trying until the sensor shows up.
    while let Err(err) = sensor.begin(&mut delay) {
        eprintln!("Unable to bring up the sensor: {}", err);
        sleep(Duration::from_secs(1));
    }
    let range = TemperatureRange::default();
    let mut temperatures = [0f32; PIXEL_COUNT];
    // 10 FPS
    let frame_delay = Duration::from_millis(100);
    loop {
        let ambient = sensor.read_thermistor()?;
        sensor.read_pixels_to(&mut temperatures)?;
        let colours = convert_to_heatmap(&temperatures, range);
        // Move back to the top left of the screen before drawing.
        print!("\x1B[H\x1B[2J");
        println!("Thermistor: {:5.2}℃", ambient);
        print_heatmap(&temperatures, &colours);
        sleep(frame_delay);
    }
}

fn print_heatmap(temperatures: &[f32], colours: &[Rgb]) {
    for (count, (temperature, colour)) in temperatures.iter().zip(colours.iter()).enumerate() {
        if count % WIDTH == 0 {
            println!();
        }
        print!(
            "\x1B[48;2;{};{};{}m {:5.2} \x1B[0m",
            colour.r, colour.g, colour.b, temperature
        );
    }
    println!();
}
