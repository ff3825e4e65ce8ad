use console::Style;

use crate::run_config::RunConfig;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    flag_on: Style,
    flag_off: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            flag_on: Style::new().green(),
            flag_off: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &RunConfig, n_files: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Heliodiff Asset Run"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Event"),
        s.value.apply_to(&config.event)
    );
    println!(
        "  {:<14}{} / {} / {}-day background",
        s.label.apply_to("Stream"),
        s.value.apply_to(&config.craft),
        s.value.apply_to(&config.camera),
        s.value.apply_to(config.background)
    );
    println!(
        "  {:<14}{} .. {}",
        s.label.apply_to("Window"),
        s.value.apply_to(config.t_start),
        s.value.apply_to(config.t_stop)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(n_files)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Data root"),
        s.path.apply_to(config.data_root.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.out_root.display())
    );

    let flag = |on: bool, name: &str| {
        if on {
            format!("{}", s.flag_on.apply_to(name))
        } else {
            format!("{}", s.flag_off.apply_to(format!("no {}", name)))
        }
    };
    println!(
        "  {:<14}{}  {}  {}",
        s.label.apply_to("Processing"),
        flag(config.processing.align, "align"),
        flag(config.processing.star_suppress, "star-suppress"),
        flag(config.processing.smoothing, "smoothing")
    );
    println!();
}
