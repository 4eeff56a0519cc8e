mod generate;
mod solve;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use pour_solver::difficulty::DifficultyWeights;
use pour_solver::generation::{GeneratorConfig, TemplateRequest};
use pour_solver::pour::Params;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Everything a `--config` file may set. Missing keys keep their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    params: Params,
    generator: GeneratorConfig,
    template: TemplateRequest,
    weights: DifficultyWeights,
}

impl CliConfig {
    fn load(path: &Path) -> Result<CliConfig, Box<dyn Error>> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

fn override_with<T>(matches: &ArgMatches, name: &str, target: &mut T) -> Result<(), Box<dyn Error>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    if let Some(value) = matches.value_of(name) {
        *target = value.parse()?;
    }

    Ok(())
}

fn numeric_arg<'a>(name: &'a str, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name(name).long(name).help(help).takes_value(true)
}

fn generate_config(matches: &ArgMatches) -> Result<CliConfig, Box<dyn Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => CliConfig::load(Path::new(path))?,
        None => CliConfig::default(),
    };

    override_with(matches, "colors", &mut config.params.num_colors)?;
    override_with(matches, "bottles", &mut config.params.num_bottles)?;
    override_with(matches, "capacity", &mut config.params.capacity)?;
    override_with(matches, "seed", &mut config.generator.seed)?;
    override_with(matches, "attempts", &mut config.generator.attempts)?;
    override_with(matches, "solve-time", &mut config.generator.solve_time_ms)?;
    override_with(matches, "cloth", &mut config.template.cloth)?;
    override_with(matches, "vine", &mut config.template.vine)?;
    override_with(matches, "bush", &mut config.template.bush)?;
    override_with(matches, "hidden", &mut config.template.hidden)?;
    override_with(matches, "hidden-cap", &mut config.template.hidden_per_bottle_cap)?;

    if matches.is_present("scramble") {
        config.generator.start_mixed = false;
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let matches = App::new("Pour Solver")
        .subcommand(
            SubCommand::with_name("generate")
                .about("Generate pour puzzles and append them to a CSV record file")
                .arg(
                    Arg::with_name("out")
                        .help("The record file to write the generated puzzles to")
                        .short("o")
                        .long("out")
                        .default_value("generated_puzzles.csv")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("count")
                        .help("The number of puzzles to generate")
                        .short("n")
                        .long("count")
                        .default_value("10")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("threads")
                        .help("The number of threads to use")
                        .long("threads")
                        .default_value("4")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("append")
                        .help("Append to an existing record file instead of replacing it")
                        .long("append"),
                )
                .arg(
                    Arg::with_name("scramble")
                        .help("Scramble the sorted arrangement instead of dealing randomly")
                        .long("scramble"),
                )
                .arg(
                    Arg::with_name("config")
                        .help("A JSON file of puzzle, generator, template and weight settings")
                        .long("config")
                        .takes_value(true),
                )
                .arg(numeric_arg("colors", "Number of colours"))
                .arg(numeric_arg("bottles", "Number of bottles"))
                .arg(numeric_arg("capacity", "Units each bottle holds"))
                .arg(numeric_arg("seed", "Base seed, offset by the worker index"))
                .arg(numeric_arg("attempts", "Candidates tried per puzzle"))
                .arg(numeric_arg("solve-time", "Search budget per candidate in milliseconds"))
                .arg(numeric_arg("cloth", "Cloth bottles per puzzle"))
                .arg(numeric_arg("vine", "Vine bottles per puzzle"))
                .arg(numeric_arg("bush", "Bush bottles per puzzle"))
                .arg(numeric_arg("hidden", "Hidden slots per puzzle"))
                .arg(numeric_arg("hidden-cap", "Hidden slots allowed in a single bottle")),
        )
        .subcommand(
            SubCommand::with_name("solve")
                .about("Re-solve every puzzle of a record file and report its difficulty")
                .arg(
                    Arg::with_name("file")
                        .help("The record file to read")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("timeout")
                        .help("Search budget per puzzle in milliseconds")
                        .long("timeout")
                        .default_value("10000")
                        .takes_value(true),
                ),
        )
        .setting(AppSettings::ArgRequiredElseHelp)
        .get_matches();

    match matches.subcommand() {
        ("generate", Some(matches)) => {
            let out = matches.value_of("out").unwrap();
            let count = matches.value_of("count").unwrap();
            let threads = matches.value_of("threads").unwrap();

            generate::run(
                Path::new(out),
                generate_config(matches)?,
                str::parse(count)?,
                str::parse(threads)?,
                matches.is_present("append"),
            )
        }
        ("solve", Some(matches)) => {
            let file = matches.value_of("file").unwrap();
            let timeout = matches.value_of("timeout").unwrap();

            solve::run(Path::new(file), str::parse(timeout)?)
        }
        _ => Ok(()),
    }
}
