use megasena_db::models::{ClassifiedNumber, NumberClass, BOARD_SIZE};

use super::Tally;

/// Margens sobre a frequência esperada que separam ouro / comum / fraca.
const GOLD_MARGIN: f64 = 1.2;
const POOR_MARGIN: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct GoldAnalysis {
    /// Acima de 120% do esperado, da mais frequente para a menos.
    pub gold: Vec<ClassifiedNumber>,
    pub common: Vec<ClassifiedNumber>,
    /// Abaixo de 80% do esperado, da menos frequente para a mais.
    pub poor: Vec<ClassifiedNumber>,
}

impl GoldAnalysis {
    pub fn class_of(&self, number: u8) -> Option<&ClassifiedNumber> {
        self.gold
            .iter()
            .chain(self.common.iter())
            .chain(self.poor.iter())
            .find(|c| c.number == number)
    }
}

/// Classifica cada dezena 1-60 contra a frequência esperada sob
/// uniformidade. Função pura do tally; toda dezena cai em exatamente
/// uma das três classes.
pub fn classify_numbers(tally: &Tally) -> GoldAnalysis {
    let expected = tally.expected();

    let mut gold = Vec::new();
    let mut common = Vec::new();
    let mut poor = Vec::new();

    for number in 1..=BOARD_SIZE {
        let count = tally.count_of(number);
        let percent = if tally.total_draws > 0 {
            100.0 * count as f64 / tally.total_draws as f64
        } else {
            0.0
        };
        let deviation = count as f64 - expected;
        let class = if (count as f64) > expected * GOLD_MARGIN {
            NumberClass::Ouro
        } else if (count as f64) < expected * POOR_MARGIN {
            NumberClass::Fraco
        } else {
            NumberClass::Comum
        };

        let entry = ClassifiedNumber {
            number,
            count,
            percent,
            deviation,
            class,
        };
        match class {
            NumberClass::Ouro => gold.push(entry),
            NumberClass::Comum => common.push(entry),
            NumberClass::Fraco => poor.push(entry),
        }
    }

    gold.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    poor.sort_by(|a, b| a.count.cmp(&b.count).then(a.number.cmp(&b.number)));

    GoldAnalysis { gold, common, poor }
}
