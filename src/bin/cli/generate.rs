use crate::CliConfig;
use pour_solver::{
    generation::{GeneratedPuzzle, GenerationError, Generator},
    record::{write_rows, PuzzleRow},
    record_parser,
};
use std::{
    error::Error,
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::mpsc::channel,
    thread,
};

fn generate_puzzle(
    generator: &mut Generator<rand::rngs::SmallRng>,
    config: &CliConfig,
) -> Result<GeneratedPuzzle, GenerationError> {
    let request = &config.template;

    if request.gimmick_count() > 0 || request.hidden > 0 {
        let template = generator.build_auto_template(request)?;
        generator.set_template(template)?;
    }

    generator.make_one(None)
}

fn open_output(path: &Path, append: bool) -> Result<(File, usize), Box<dyn Error>> {
    if append && path.exists() {
        let existing = record_parser::load(path)?;
        let file = OpenOptions::new().append(true).open(path)?;

        println!(
            "Appending to {} after {} existing rows",
            path.display(),
            existing.valid_rows.len()
        );

        return Ok((file, existing.next_index()));
    }

    let mut file = File::create(path)?;
    write_rows(&mut file, &[], true)?;

    Ok((file, 0))
}

pub fn run(
    path: &Path,
    config: CliConfig,
    count: usize,
    thread_count: u64,
    append: bool,
) -> Result<(), Box<dyn Error>> {
    let (mut file, mut index) = open_output(path, append)?;

    let (tx, rx) = channel();

    for worker in 0..thread_count {
        let tx = tx.clone();
        let config = config.clone();

        thread::spawn(move || {
            let mut generator_config = config.generator.clone();
            generator_config.seed = generator_config.seed.wrapping_add(worker);

            let mut generator = Generator::from_config(config.params, generator_config)
                .with_weights(config.weights.clone());

            loop {
                let result = generate_puzzle(&mut generator, &config);

                if tx.send(result).is_err() {
                    break;
                }
            }
        });
    }

    drop(tx);

    let mut generated = 0;

    while generated < count {
        let puzzle = match rx.recv()? {
            Ok(puzzle) => puzzle,
            Err(GenerationError::NoCandidate { attempts }) => {
                println!("No puzzle after {} attempts, retrying", attempts);
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        let row = PuzzleRow::from_puzzle(index, &puzzle);
        write_rows(&mut file, &[row], false)?;
        file.flush()?;

        println!(
            "Generated #{}: {} moves, {:.2} {}",
            index, puzzle.min_moves, puzzle.difficulty.score, puzzle.difficulty.label
        );

        index += 1;
        generated += 1;
    }

    println!("Wrote {} puzzles to {}", generated, path.display());

    Ok(())
}
