use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::{Chart, Plot, Shape};

use megasena_db::models::{ClassifiedNumber, NumberClass, BOARD_SIZE, PICK_COUNT};

use crate::analysis::gold::GoldAnalysis;
use crate::analysis::uniformity::UniformityResult;
use crate::analysis::Tally;
use crate::generator::Recommendation;

pub fn display_tally_summary(tally: &Tally) {
    println!("\n📊 {} sorteios analisados", tally.total_draws);
    if tally.skipped > 0 {
        println!("   ({} concursos sem dezenas, ignorados)", tally.skipped);
    }
}

pub fn display_classification(analysis: &GoldAnalysis) {
    println!("\n── Dezenas de ouro (acima de 120% do esperado) ──");
    if analysis.gold.is_empty() {
        println!("Nenhuma dezena acima da margem.");
    } else {
        display_number_table(&analysis.gold, Color::Yellow);
    }

    println!("\n── Dezenas frias (abaixo de 80% do esperado) ──");
    if analysis.poor.is_empty() {
        println!("Nenhuma dezena abaixo da margem.");
    } else {
        display_number_table(&analysis.poor, Color::Blue);
    }
}

fn display_number_table(entries: &[ClassifiedNumber], color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Frequência", "% dos sorteios", "Desvio"]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.number)).fg(color),
            Cell::new(entry.count.to_string()),
            Cell::new(format!("{:.1}%", entry.percent)),
            Cell::new(format!("{:+.1}", entry.deviation)),
        ]);
    }
    println!("{table}");
}

pub fn display_uniformity(result: &UniformityResult) {
    let verdict = if result.biased {
        "viés detectado"
    } else {
        "nenhum viés detectável"
    };
    println!(
        "\n🎯 Teste de uniformidade: χ² = {:.2}, p = {:.4} → {}",
        result.statistic, result.p_value, verdict
    );
}

pub fn display_recommendation(rec: &Recommendation) {
    println!("\n🎲 Jogos recomendados\n");
    println!("Score ideal (6 dezenas mais frequentes): {}", rec.ideal_score);
    println!("Score mínimo aceito: {:.1}", rec.min_score);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Dezenas", "Score"]);

    for (i, game) in rec.games.iter().enumerate() {
        let numbers = game
            .numbers
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        table.add_row(vec![
            format!("{}", i + 1),
            numbers,
            game.score.to_string(),
        ]);
    }
    println!("{table}");

    if !rec.reached_target() {
        println!(
            "⚠️  Apenas {} de {} jogos atenderam aos critérios de score e diversidade.",
            rec.games.len(),
            rec.target
        );
    }
}

pub fn display_game_check(
    numbers: &[u8; PICK_COUNT],
    score: u32,
    ideal_score: u32,
    analysis: &GoldAnalysis,
) {
    let joined = numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ");
    println!("\nJogo conferido: {joined}");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Frequência", "% dos sorteios", "Classe"]);

    for &n in numbers {
        if let Some(entry) = analysis.class_of(n) {
            let color = match entry.class {
                NumberClass::Ouro => Color::Yellow,
                NumberClass::Fraco => Color::Blue,
                NumberClass::Comum => Color::White,
            };
            table.add_row(vec![
                Cell::new(format!("{:2}", entry.number)),
                Cell::new(entry.count.to_string()),
                Cell::new(format!("{:.1}%", entry.percent)),
                Cell::new(entry.class.to_string()).fg(color),
            ]);
        }
    }
    println!("{table}");

    let ratio = if ideal_score > 0 {
        100.0 * f64::from(score) / f64::from(ideal_score)
    } else {
        0.0
    };
    println!("Score: {} ({:.1}% do ideal {})", score, ratio, ideal_score);
}

/// Gráfico ASCII da distribuição de frequência. Observabilidade apenas:
/// nada do pipeline depende do desenho.
pub fn display_frequency_chart(tally: &Tally) {
    if tally.total_draws == 0 {
        return;
    }
    println!("\nFrequência por dezena (1-60):");
    let points: Vec<(f32, f32)> = (1..=BOARD_SIZE)
        .map(|n| (f32::from(n), tally.count_of(n) as f32))
        .collect();
    Chart::new(180, 60, 1.0, f32::from(BOARD_SIZE))
        .lineplot(&Shape::Bars(&points))
        .display();
}
