use pour_solver::{
    difficulty::{assess, DifficultyWeights},
    record::PuzzleRow,
    record_parser,
    solver::{Profile, Solution, Solver},
};
use std::{error::Error, path::Path, time::Duration};

fn describe_count(solution: &Solution<Profile>) -> String {
    let count = &solution.solution_count;

    if count.timed_out {
        format!("{}+ solutions (count timed out)", count.count)
    } else if count.limit_hit {
        format!("{}+ solutions", count.count)
    } else if count.is_unique() {
        String::from("unique solution")
    } else {
        format!("{} solutions", count.count)
    }
}

fn solve_row(row: &PuzzleRow, timeout: Duration, weights: &DifficultyWeights) {
    let state = match row.decode() {
        Ok(state) => state,
        Err(error) => {
            println!("#{}: {}", row.index, error);
            return;
        }
    };

    let solution: Solution<Profile> = Solver::new(&state).solve_with_timeout(timeout);

    if !solution.solved {
        if solution.timed_out {
            println!("#{}: timed out, at least {} moves", row.index, solution.min_moves);
        } else {
            println!("#{}: unsolvable", row.index);
        }
        return;
    }

    let difficulty = assess(&state, &solution, weights);

    println!(
        "#{}: {} moves (recorded {}), {}, difficulty {:.2} {} (recorded {:.2} {})",
        row.index,
        solution.min_moves,
        row.min_moves,
        describe_count(&solution),
        difficulty.score,
        difficulty.label,
        row.difficulty_score,
        row.difficulty_label
    );
    println!("{}", difficulty.breakdown);
    println!("{}", solution.profiler.print());
}

pub fn run(path: &Path, timeout_ms: u64) -> Result<(), Box<dyn Error>> {
    let collection = record_parser::load(path)?;
    let weights = DifficultyWeights::default();
    let timeout = Duration::from_millis(timeout_ms);

    println!(
        "Solving {} of {} rows in {}",
        collection.valid_rows.len(),
        collection.total_rows,
        path.display()
    );

    for row in collection.valid_rows.iter() {
        solve_row(row, timeout, &weights);
    }

    Ok(())
}
