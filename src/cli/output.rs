//! Output formatting for CLI

use crate::{
    pipeline::{AgentSnapshot, EvaluationResult, TrainingReport},
    tictactoe::State,
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a fraction as a percentage with one decimal
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, &str)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

pub fn print_agent_snapshot(name: &str, snapshot: &AgentSnapshot) {
    print_subsection(name);
    print_stats_table(&[
        ("Alpha", &snapshot.learning_rate.to_string()),
        ("Gamma", &snapshot.discount_factor.to_string()),
        (
            "Epsilon",
            &format!(
                "{:.4} -> {:.4}",
                snapshot.initial_epsilon, snapshot.final_epsilon
            ),
        ),
        ("Episodes", &format_number(snapshot.episodes)),
        ("Wins", &format_number(snapshot.wins)),
        ("Draws", &format_number(snapshot.draws)),
        ("Losses", &format_number(snapshot.losses)),
        ("Known states", &format_number(snapshot.known_states)),
    ]);
}

pub fn print_training_report(report: &TrainingReport) {
    print_section("Training Results");
    print_stats_table(&[
        ("Board", &format!("{0}x{0}", report.board_size)),
        ("Episodes", &format_number(report.episodes)),
        ("Elapsed", &format!("{:.2}s", report.elapsed_seconds)),
        (
            "Checkpoint failures",
            &report.checkpoint_failures.to_string(),
        ),
    ]);
    print_agent_snapshot("Agent X", &report.agent_x);
    print_agent_snapshot("Agent O", &report.agent_o);

    if let Some(last) = report.history.last() {
        print_subsection("Last window");
        print_stats_table(&[
            ("X wins", &format_number(last.x_wins)),
            ("O wins", &format_number(last.o_wins)),
            ("Draws", &format_percent(last.draw_rate())),
        ]);
    }
}

pub fn print_evaluation(result: &EvaluationResult) {
    print_subsection(&format!("Evaluation ({} greedy games)", result.games));
    print_stats_table(&[
        ("X wins", &format_percent(result.x_win_rate())),
        ("O wins", &format_percent(result.o_win_rate())),
        ("Draws", &format_percent(result.draw_rate())),
        ("Verdict", &result.verdict().to_string()),
    ]);
}

/// Render a board with the value of every scored cell in place of the cell
pub fn format_board_values(state: &State, values: &[(usize, f64)]) -> String {
    let size = state.size();
    let mut rows = Vec::with_capacity(size);
    for row in 0..size {
        let cells: Vec<String> = (0..size)
            .map(|col| {
                let pos = row * size + col;
                match values.iter().find(|(action, _)| *action == pos) {
                    Some((_, q)) => format!("{q:>7.3}"),
                    None => {
                        let mark = state.get(pos).map(|c| c.to_char()).unwrap_or('?');
                        format!("{mark:>7}")
                    }
                }
            })
            .collect();
        rows.push(cells.join(" "));
    }
    rows.join("\n")
}
