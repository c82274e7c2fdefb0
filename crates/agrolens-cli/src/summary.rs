use agrolens_core::engine::AnalysisResult;
use agrolens_core::forecast::ForecastResult;
use agrolens_core::indices::IndexInfo;
use agrolens_core::timeseries::{Provenance, SeriesOutcome};
use agrolens_core::zoning::ZoningResult;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    accent: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            accent: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!(
        "  {}",
        s.title.apply_to("\u{2550}".repeat(title.chars().count()))
    );
    println!();
}

pub fn print_analysis_summary(result: &AnalysisResult) {
    let s = Styles::new();
    let stats = &result.stats;
    print_title(&s, "Field Analysis");

    println!(
        "  {:<16}{}",
        s.label.apply_to("Captured"),
        s.value.apply_to(stats.capture_date)
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Area"),
        s.value.apply_to(format!("{:.2} ha", stats.area_ha))
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Cloud cover"),
        s.value.apply_to(format!("{:.1}%", stats.cloud_coverage_percent))
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Valid pixels"),
        s.value.apply_to(stats.valid_pixel_count)
    );
    println!();

    println!("  {}", s.header.apply_to(stats.index));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Mean"),
        s.accent.apply_to(format!("{:.3}", stats.mean_index))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Range"),
        s.value
            .apply_to(format!("{:.3} .. {:.3}", stats.min_index, stats.max_index))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Std dev"),
        s.value.apply_to(format!("{:.3}", stats.std_index))
    );
    let z = &stats.zones_percent;
    println!(
        "    {:<14}{}",
        s.label.apply_to("Low/Med/High"),
        s.value
            .apply_to(format!("{:.1}% / {:.1}% / {:.1}%", z.low, z.medium, z.high))
    );
    println!();

    if !stats.extra.is_empty() {
        println!("  {}", s.header.apply_to("Other indices"));
        for (index, summary) in &stats.extra {
            println!(
                "    {:<14}{}",
                s.label.apply_to(index),
                s.value.apply_to(format!(
                    "mean {:.3}  range {:.3} .. {:.3}",
                    summary.mean, summary.min, summary.max
                ))
            );
        }
        println!();
    }
}

pub fn print_zoning_summary(result: &ZoningResult) {
    let s = Styles::new();
    print_title(&s, "Management Zones");

    println!(
        "  {:<6}{:<12}{:>8}{:>10}{:>10}{:>10}",
        s.label.apply_to("Zone"),
        s.label.apply_to("Label"),
        s.label.apply_to("Mean"),
        s.label.apply_to("Pixels"),
        s.label.apply_to("Area ha"),
        s.label.apply_to("Share")
    );
    for zone in &result.zones {
        println!(
            "  {:<6}{:<12}{:>8.3}{:>10}{:>10.2}{:>9.1}%",
            s.accent.apply_to(zone.zone_id),
            zone.label,
            zone.mean_index,
            zone.pixel_count,
            zone.area_ha,
            zone.percent_of_field
        );
    }
    println!();
    println!(
        "  {:<16}{}",
        s.label.apply_to("Polygons"),
        s.value.apply_to(result.features.polygon_count())
    );
    println!();
}

pub fn print_series_summary(outcome: &SeriesOutcome) {
    let s = Styles::new();
    print_title(&s, "Index Time Series");

    for point in &outcome.points {
        if point.provenance == Provenance::Historical {
            println!(
                "  {}  {}",
                s.label.apply_to(point.date),
                s.value.apply_to(format!("{:.3}", point.value))
            );
        }
    }
    println!();
    println!(
        "  {:<16}{}",
        s.label.apply_to("Observed"),
        s.value.apply_to(outcome.historical_count())
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Daily points"),
        s.value.apply_to(outcome.points.len())
    );
    if outcome.skipped.is_empty() {
        println!(
            "  {:<16}{}",
            s.label.apply_to("Skipped"),
            s.disabled.apply_to("none")
        );
    } else {
        println!("  {}", s.header.apply_to("Skipped"));
        for skipped in &outcome.skipped {
            println!(
                "    {}  {}",
                s.label.apply_to(skipped.date),
                s.disabled.apply_to(&skipped.reason)
            );
        }
    }
    if outcome.cancelled {
        println!("  {}", s.disabled.apply_to("Request was cancelled; series is partial"));
    }
    println!();
}

pub fn print_forecast_summary(result: &ForecastResult) {
    let s = Styles::new();
    let meta = &result.metadata;
    print_title(&s, "Forecast");

    println!(
        "  {:<16}{}",
        s.label.apply_to("Model"),
        s.accent.apply_to(&meta.model_type)
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Trained on"),
        s.value.apply_to(format!("{} points", meta.training_point_count))
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Training RMSE"),
        s.value.apply_to(format!("{:.4}", meta.training_rmse))
    );
    println!();

    for point in result.forecast_points() {
        println!(
            "  {}  {}",
            s.label.apply_to(point.date),
            s.value.apply_to(format!("{:.3}", point.value))
        );
    }
    println!();
}

pub fn print_index_catalog(catalog: &[IndexInfo]) {
    let s = Styles::new();
    print_title(&s, "Vegetation Indices");

    for info in catalog {
        println!(
            "  {}  {}",
            s.header.apply_to(info.index),
            s.value.apply_to(info.name)
        );
        println!("    {}", s.label.apply_to(info.formula));
        for (range, meaning) in info.interpretation {
            println!("    {:<12}{}", s.accent.apply_to(range), meaning);
        }
        println!();
    }
}
