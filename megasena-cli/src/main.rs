mod analysis;
mod display;
mod fetch;
mod generator;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use megasena_db::archive::{archive_path, save_archive};
use megasena_db::models::{validate_game, PICK_COUNT};

use crate::analysis::compute_tally;
use crate::analysis::gold::classify_numbers;
use crate::analysis::uniformity::chi_square_uniformity;
use crate::display::{
    display_classification, display_frequency_chart, display_game_check,
    display_recommendation, display_tally_summary, display_uniformity,
};
use crate::fetch::{build_client, fetch_archive, load_or_fetch};
use crate::generator::{game_score, recommend};

#[derive(Parser)]
#[command(name = "megasena", about = "Gerador de jogos da Mega Sena por análise estatística")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Baixar novamente todos os concursos da API da Caixa
    Atualizar,

    /// Mostrar o caminho do arquivo de sorteios
    Caminho,

    /// Estatísticas de frequência das dezenas
    Stats,

    /// Gerar jogos recomendados
    Gerar {
        /// Quantidade de jogos
        #[arg(short, long, default_value = "30")]
        jogos: usize,

        /// Força a atualização dos dados antes de gerar
        #[arg(long)]
        atualizar: bool,
    },

    /// Conferir um jogo contra o histórico
    Conferir {
        /// 6 dezenas (1-60)
        dezenas: Vec<u8>,
    },
}

fn main() -> Result<()> {
    // Interrupção do usuário é cancelamento controlado, não erro
    ctrlc::set_handler(|| {
        eprintln!("\n⚠️  Operação cancelada pelo usuário.");
        std::process::exit(0);
    })
    .context("Não foi possível instalar o tratador de interrupção")?;

    let cli = Cli::parse();
    let path = archive_path();

    match cli.command {
        Command::Atualizar => cmd_atualizar(&path),
        Command::Caminho => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Stats => cmd_stats(&path),
        Command::Gerar { jogos, atualizar } => cmd_gerar(&path, jogos, atualizar),
        Command::Conferir { dezenas } => cmd_conferir(&path, &dezenas),
    }
}

fn cmd_atualizar(path: &Path) -> Result<()> {
    let client = build_client()?;
    let archive = fetch_archive(&client)?;
    save_archive(&archive, path)?;
    println!(
        "Arquivo salvo em {} ({} sorteios, concurso mais recente: {})",
        path.display(),
        archive.len(),
        archive.last_id().unwrap_or(0)
    );
    Ok(())
}

fn cmd_stats(path: &Path) -> Result<()> {
    let archive = load_or_fetch(path, false)?;
    let tally = compute_tally(&archive);
    display_tally_summary(&tally);

    let analysis = classify_numbers(&tally);
    display_classification(&analysis);

    let uniformity = chi_square_uniformity(&tally);
    display_uniformity(&uniformity);

    display_frequency_chart(&tally);
    Ok(())
}

fn cmd_gerar(path: &Path, jogos: usize, atualizar: bool) -> Result<()> {
    let archive = load_or_fetch(path, atualizar)?;
    let tally = compute_tally(&archive);
    display_tally_summary(&tally);

    let rec = recommend(&tally, jogos)?;

    display_classification(&rec.analysis);
    display_uniformity(&rec.uniformity);
    display_recommendation(&rec);
    display_frequency_chart(&tally);

    Ok(())
}

fn cmd_conferir(path: &Path, dezenas: &[u8]) -> Result<()> {
    if dezenas.len() != PICK_COUNT {
        bail!("Esperadas {} dezenas, recebidas {}", PICK_COUNT, dezenas.len());
    }
    let mut numbers = [0u8; PICK_COUNT];
    numbers.copy_from_slice(dezenas);
    numbers.sort_unstable();
    validate_game(&numbers)?;

    let archive = load_or_fetch(path, false)?;
    let tally = compute_tally(&archive);
    if tally.total_draws == 0 {
        bail!("Nenhum concurso com dezenas no arquivo");
    }

    let score = game_score(&numbers, &tally);
    let ideal_score: u32 = tally
        .top(PICK_COUNT)
        .iter()
        .map(|&n| tally.count_of(n))
        .sum();
    let analysis = classify_numbers(&tally);

    display_game_check(&numbers, score, ideal_score, &analysis);
    Ok(())
}
