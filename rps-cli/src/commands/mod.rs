use anyhow::{anyhow, Result};
use chrono::DateTime;
use comfy_table::{presets::UTF8_FULL, Table};
use rps_game::{Game, GameContract, GamePhase, GameService};

pub async fn invoke(contract: &GameContract, function: &str, args: Vec<String>) -> Result<()> {
    let response = contract.invoke(function, &args).await;
    if !response.is_ok() {
        return Err(anyhow!(response.message));
    }

    let payload = response.payload_str();
    match function {
        "createGame" | "joinGame" => {
            println!("Move cell: {}", payload);
            println!("Deposit your move under this reference before the game ends.");
        }
        "endGame" if payload == "None" => {
            println!("Game settled, reconstruction requested for both moves.");
        }
        "endGame" => {
            println!("Game not over yet, {}s remaining.", payload);
        }
        _ => println!("{}", payload),
    }

    Ok(())
}

fn format_time(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn phase_label(game: &Game, now: i64) -> String {
    match game.phase(now) {
        GamePhase::Settleable => GamePhase::Settleable.as_str().to_string(),
        phase => format!("{} ({}s left)", phase.as_str(), game.remaining_secs(now)),
    }
}

pub async fn show_game_status(service: &GameService, name: &str) -> Result<()> {
    let game = service.game(name).await?;
    let version = service.version(name).await?.unwrap_or(0);
    let now = service.now();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Name", game.name.as_str()]);
    table.add_row(vec!["Phase", phase_label(&game, now).as_str()]);
    table.add_row(vec!["Player 1", game.player1.as_str()]);
    table.add_row(vec!["Move cell 1", game.move1_ref.as_str()]);
    table.add_row(vec!["Player 2", game.player2.as_str()]);
    table.add_row(vec!["Move cell 2", game.move2_ref.as_str()]);
    table.add_row(vec!["Created", format_time(game.created_at).as_str()]);
    table.add_row(vec!["Ends", format_time(game.deadline()).as_str()]);
    table.add_row(vec!["Result", game.result.as_str()]);
    table.add_row(vec!["Version", version.to_string().as_str()]);

    println!("{}", table);
    Ok(())
}

pub async fn list_games(service: &GameService) -> Result<()> {
    let games = service.list_games().await?;
    if games.is_empty() {
        println!("No games found");
        return Ok(());
    }

    let now = service.now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Player 1", "Player 2", "Phase", "Ends"]);

    for game in &games {
        table.add_row(vec![
            game.name.clone(),
            game.player1.clone(),
            game.player2.clone(),
            phase_label(game, now),
            format_time(game.deadline()),
        ]);
    }

    println!("{}", table);
    Ok(())
}
