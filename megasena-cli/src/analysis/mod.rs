pub mod gold;
pub mod uniformity;

use megasena_db::archive::Archive;
use megasena_db::models::{BOARD_SIZE, PICK_COUNT};

/// Contagem de ocorrências por dezena sobre todos os concursos do arquivo.
/// Recalculada a cada execução; nada aqui é persistido.
#[derive(Debug, Clone)]
pub struct Tally {
    /// Índice = dezena - 1.
    pub counts: Vec<u32>,
    /// Concursos com lista de dezenas aproveitável.
    pub total_draws: u32,
    /// Concursos descartados por falta de dezenas.
    pub skipped: u32,
}

impl Tally {
    pub fn count_of(&self, number: u8) -> u32 {
        self.counts[(number - 1) as usize]
    }

    /// Frequência esperada por dezena sob uniformidade: 6 × N / 60.
    pub fn expected(&self) -> f64 {
        PICK_COUNT as f64 * self.total_draws as f64 / BOARD_SIZE as f64
    }

    /// Todas as dezenas, da mais frequente para a menos frequente
    /// (empates resolvidos pela dezena menor, para manter o determinismo).
    pub fn ranked_numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = (1..=BOARD_SIZE).collect();
        numbers.sort_by(|&a, &b| self.count_of(b).cmp(&self.count_of(a)).then(a.cmp(&b)));
        numbers
    }

    pub fn top(&self, n: usize) -> Vec<u8> {
        let mut ranked = self.ranked_numbers();
        ranked.truncate(n);
        ranked
    }
}

pub fn compute_tally(archive: &Archive) -> Tally {
    let mut counts = vec![0u32; BOARD_SIZE as usize];
    let mut total_draws = 0u32;
    let mut skipped = 0u32;

    for record in archive.records() {
        match record.drawn_numbers() {
            Some(numbers) => {
                total_draws += 1;
                for n in numbers {
                    counts[(n - 1) as usize] += 1;
                }
            }
            None => {
                skipped += 1;
                eprintln!("Concurso {} sem dezenas aproveitáveis, ignorado", record.numero);
            }
        }
    }

    Tally {
        counts,
        total_draws,
        skipped,
    }
}
