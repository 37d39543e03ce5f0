use crate::types::Float;
use plotters::prelude::*;

/// Plot one or more series sampled every dt seconds into `<file_name>.png`.
pub fn plot(
    series: &[(&str, Vec<Float>)],
    dt: Float,
    caption: &str,
    file_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let num_steps = series.iter().map(|(_, data)| data.len()).max().unwrap_or(0);
    if num_steps == 0 {
        return Ok(());
    }
    let final_time = num_steps as Float * dt;

    // Determine y-axis limits based on the minimum and maximum values in the data
    let values = series.iter().flat_map(|(_, data)| data.iter().cloned());
    let min_y = values.clone().fold(Float::INFINITY, Float::min);
    let max_y = values.fold(Float::NEG_INFINITY, Float::max);
    let (min_y, max_y) = if min_y < max_y {
        (min_y, max_y)
    } else {
        (min_y - 1.0, max_y + 1.0) // flat line
    };

    // Create a plotting area
    let path = format!("{}.png", file_name);
    let root = BitMapBackend::new(&path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    // Configure the chart
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..final_time, min_y..max_y)?;

    chart.configure_mesh().x_desc("t [s]").draw()?;

    // Plot the data
    for (i, (label, data)) in series.iter().enumerate() {
        let color = Palette99::pick(i);
        chart
            .draw_series(LineSeries::new(
                data.iter().enumerate().map(|(k, y)| (k as Float * dt, *y)),
                &color,
            ))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;

    // Present the result
    root.present()?;
    Ok(())
}
