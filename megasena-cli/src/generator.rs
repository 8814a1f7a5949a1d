use anyhow::{bail, Result};
use megasena_db::models::{Game, PICK_COUNT};

use crate::analysis::gold::{classify_numbers, GoldAnalysis};
use crate::analysis::uniformity::{chi_square_uniformity, UniformityResult};
use crate::analysis::Tally;

/// Teto de tentativas de montagem em uma chamada de síntese.
const MAX_ATTEMPTS: usize = 30;
/// Tamanho mínimo da piscina de dezenas de ouro (completada com as mais
/// frequentes quando há menos de 20 dezenas de ouro).
const GOLD_POOL_SIZE: usize = 20;
/// Rodadas extras de síntese quando o filtro final não atinge a meta.
const EXTRA_ROUNDS: usize = 20;
/// Sobreposição máxima entre dois jogos da lista final.
const FINAL_OVERLAP_LIMIT: usize = 3;
/// Fração do score ideal exigida de um jogo recomendado.
const MIN_SCORE_RATIO: f64 = 0.9;

/// Quantas dezenas dois jogos têm em comum.
pub fn overlap(a: &[u8; PICK_COUNT], b: &[u8; PICK_COUNT]) -> usize {
    a.iter().filter(|n| b.contains(n)).count()
}

/// Dois jogos conflitam sob o limite `m` quando compartilham mais de `m`
/// dezenas. Simétrica por construção.
pub fn conflicts(a: &[u8; PICK_COUNT], b: &[u8; PICK_COUNT], limit: usize) -> bool {
    overlap(a, b) > limit
}

pub fn game_score(numbers: &[u8; PICK_COUNT], tally: &Tally) -> u32 {
    numbers.iter().map(|&n| tally.count_of(n)).sum()
}

/// Síntese determinística de até `quantity` jogos a partir de uma piscina
/// de dezenas, enviesada para as mais frequentes e com diversidade mútua
/// garantida por um limite de sobreposição entre pares.
pub fn build_combinations(pool: &[u8], tally: &Tally, quantity: usize) -> Vec<Game> {
    if pool.len() < PICK_COUNT || quantity == 0 {
        return Vec::new();
    }

    let mut pool: Vec<u8> = pool.to_vec();
    pool.sort_by(|&a, &b| tally.count_of(b).cmp(&tally.count_of(a)).then(a.cmp(&b)));

    let attempts = (2 * quantity).min(MAX_ATTEMPTS);
    let mut accepted: Vec<Game> = Vec::with_capacity(quantity);

    for attempt in 0..attempts {
        if accepted.len() >= quantity {
            break;
        }
        let Some(numbers) = assemble(&pool, attempt) else {
            continue;
        };

        // O limite aperta de 4 para 3 depois da metade da meta; o sentido
        // invertido é intencionalmente preservado do gerador original.
        let limit = if accepted.len() > quantity / 2 { 3 } else { 4 };
        if accepted.iter().any(|g| conflicts(&g.numbers, &numbers, limit)) {
            continue;
        }

        accepted.push(Game {
            score: game_score(&numbers, tally),
            numbers,
        });
    }

    accepted
}

/// Monta a tentativa `attempt`: até 3 sementes a partir de um offset
/// rotativo, preenchimento com um segundo índice rotativo e, por fim,
/// as dezenas restantes em ordem de frequência.
fn assemble(pool: &[u8], attempt: usize) -> Option<[u8; PICK_COUNT]> {
    let len = pool.len();
    let offset = attempt % (len.saturating_sub(5)).max(1);

    let mut numbers: Vec<u8> = Vec::with_capacity(PICK_COUNT);

    // Sementes: até 3 dezenas a partir do offset, com volta ao início
    let mut idx = offset;
    for _ in 0..len {
        if numbers.len() >= 3 {
            break;
        }
        let n = pool[idx % len];
        if !numbers.contains(&n) {
            numbers.push(n);
        }
        idx += 1;
    }

    // Preenchimento: segundo índice rotativo, sem volta ao início
    let start = (attempt + numbers.len()) % len;
    for i in start..len {
        if numbers.len() >= PICK_COUNT {
            break;
        }
        let n = pool[i];
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }

    // O que faltar sai das dezenas ainda não usadas, em ordem de frequência
    if numbers.len() < PICK_COUNT {
        for &n in pool {
            if numbers.len() >= PICK_COUNT {
                break;
            }
            if !numbers.contains(&n) {
                numbers.push(n);
            }
        }
    }

    if numbers.len() < PICK_COUNT {
        return None;
    }

    numbers.sort_unstable();
    let mut game = [0u8; PICK_COUNT];
    game.copy_from_slice(&numbers);
    Some(game)
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub analysis: GoldAnalysis,
    pub uniformity: UniformityResult,
    /// Jogos aceitos, do maior score para o menor, no máximo `target`.
    pub games: Vec<Game>,
    pub target: usize,
    pub ideal_score: u32,
    pub min_score: f64,
}

impl Recommendation {
    pub fn reached_target(&self) -> bool {
        self.games.len() >= self.target
    }
}

/// Pipeline completo: classificação, teste de uniformidade, três piscinas
/// de candidatas, síntese com sobras para compensar o filtro, e filtro
/// final por score mínimo e sobreposição. Determinístico do início ao fim.
pub fn recommend(tally: &Tally, target: usize) -> Result<Recommendation> {
    if tally.total_draws == 0 {
        bail!("Nenhum concurso com dezenas no arquivo; sem dados para gerar jogos");
    }
    if target == 0 {
        bail!("A quantidade de jogos deve ser maior que zero");
    }

    let analysis = classify_numbers(tally);
    let uniformity = chi_square_uniformity(tally);

    let ranked = tally.ranked_numbers();

    // Piscina de ouro, completada até 20 com as mais frequentes restantes
    let mut gold_pool: Vec<u8> = analysis.gold.iter().map(|c| c.number).collect();
    for &n in &ranked {
        if gold_pool.len() >= GOLD_POOL_SIZE {
            break;
        }
        if !gold_pool.contains(&n) {
            gold_pool.push(n);
        }
    }
    let top25 = tally.top(25);
    let top30 = tally.top(30);

    let ideal_score: u32 = ranked
        .iter()
        .take(PICK_COUNT)
        .map(|&n| tally.count_of(n))
        .sum();
    let min_score = f64::from(ideal_score) * MIN_SCORE_RATIO;

    // Síntese com folga: as piscinas mais estreitas produzem mais
    // candidatas porque o filtro final descarta mais delas
    let mut candidates = Vec::new();
    candidates.extend(build_combinations(&gold_pool, tally, 4 * target));
    candidates.extend(build_combinations(&top25, tally, 2 * target));
    candidates.extend(build_combinations(&top30, tally, 2 * target));

    let mut games: Vec<Game> = Vec::with_capacity(target);
    accept_candidates(&mut games, candidates, min_score);

    // Rodadas extras restritas ao top-30; como a síntese é determinística,
    // uma rodada sem aceitação nova encerra o laço antes do teto
    let mut round = 0;
    while games.len() < target && round < EXTRA_ROUNDS {
        let before = games.len();
        let extra = build_combinations(&top30, tally, 2 * target);
        accept_candidates(&mut games, extra, min_score);
        round += 1;
        if games.len() == before {
            break;
        }
    }

    games.sort_by(|a, b| b.score.cmp(&a.score).then(a.numbers.cmp(&b.numbers)));
    games.truncate(target);

    Ok(Recommendation {
        analysis,
        uniformity,
        games,
        target,
        ideal_score,
        min_score,
    })
}

/// Filtro final: score mínimo e no máximo 3 dezenas em comum com cada
/// jogo já aceito. Duplicatas caem sozinhas (sobreposição 6 > 3).
fn accept_candidates(games: &mut Vec<Game>, candidates: Vec<Game>, min_score: f64) {
    for candidate in candidates {
        if f64::from(candidate.score) < min_score {
            continue;
        }
        if games
            .iter()
            .any(|g| conflicts(&g.numbers, &candidate.numbers, FINAL_OVERLAP_LIMIT))
        {
            continue;
        }
        games.push(candidate);
    }
}
