use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BOARD_SIZE: u8 = 60;
pub const PICK_COUNT: usize = 6;

/// Um concurso tal como devolvido pela API da Caixa. Os campos que não
/// usamos ficam em `extra` e sobrevivem intactos ao ciclo salvar/carregar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRecord {
    pub numero: u32,
    #[serde(rename = "listaDezenas", skip_serializing_if = "Option::is_none")]
    pub lista_dezenas: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrawRecord {
    /// Dezenas sorteadas como números. `None` quando o campo está ausente,
    /// vazio ou contém uma entrada fora de 1-60.
    pub fn drawn_numbers(&self) -> Option<Vec<u8>> {
        let dezenas = self.lista_dezenas.as_ref()?;
        if dezenas.is_empty() {
            return None;
        }
        let mut numbers = Vec::with_capacity(dezenas.len());
        for d in dezenas {
            match d.trim().parse::<u8>() {
                Ok(n) if (1..=BOARD_SIZE).contains(&n) => numbers.push(n),
                _ => return None,
            }
        }
        Some(numbers)
    }
}

/// Um jogo de 6 dezenas, sempre ordenado de forma crescente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub numbers: [u8; PICK_COUNT],
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    Ouro,
    Comum,
    Fraco,
}

impl std::fmt::Display for NumberClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberClass::Ouro => write!(f, "OURO"),
            NumberClass::Comum => write!(f, "-"),
            NumberClass::Fraco => write!(f, "FRACA"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedNumber {
    pub number: u8,
    pub count: u32,
    pub percent: f64,
    pub deviation: f64,
    pub class: NumberClass,
}

pub fn validate_game(numbers: &[u8; PICK_COUNT]) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > BOARD_SIZE {
            bail!("Dezena {} fora do volante (1-{})", n, BOARD_SIZE);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Dezena em duplicidade: {}", numbers[i]);
            }
        }
    }
    Ok(())
}

/// Arquivo sintético para testes: o concurso `i` tem dezenas em blocos
/// rotativos de 6, todas dentro do volante.
pub fn make_test_records(n: u32) -> Vec<DrawRecord> {
    (1..=n)
        .map(|i| {
            let base = ((i - 1) % 10) as u8;
            let dezenas: Vec<String> = (0..PICK_COUNT as u8)
                .map(|k| format!("{:02}", (base * 6 + k) % BOARD_SIZE + 1))
                .collect();
            DrawRecord {
                numero: i,
                lista_dezenas: Some(dezenas),
                extra: Map::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_game_ok() {
        assert!(validate_game(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(validate_game(&[55, 56, 57, 58, 59, 60]).is_ok());
    }

    #[test]
    fn test_validate_game_out_of_range() {
        assert!(validate_game(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(validate_game(&[1, 2, 3, 4, 5, 61]).is_err());
    }

    #[test]
    fn test_validate_game_duplicate() {
        assert!(validate_game(&[1, 1, 3, 4, 5, 6]).is_err());
    }

    #[test]
    fn test_drawn_numbers_parses_padded() {
        let record = DrawRecord {
            numero: 1,
            lista_dezenas: Some(vec![
                "04".into(),
                "13".into(),
                "29".into(),
                "37".into(),
                "41".into(),
                "60".into(),
            ]),
            extra: Map::new(),
        };
        assert_eq!(record.drawn_numbers(), Some(vec![4, 13, 29, 37, 41, 60]));
    }

    #[test]
    fn test_drawn_numbers_missing_field() {
        let record = DrawRecord {
            numero: 1,
            lista_dezenas: None,
            extra: Map::new(),
        };
        assert_eq!(record.drawn_numbers(), None);
    }

    #[test]
    fn test_drawn_numbers_rejects_out_of_board() {
        let record = DrawRecord {
            numero: 1,
            lista_dezenas: Some(vec!["00".into(), "61".into()]),
            extra: Map::new(),
        };
        assert_eq!(record.drawn_numbers(), None);
    }

    #[test]
    fn test_drawn_numbers_rejects_garbage() {
        let record = DrawRecord {
            numero: 1,
            lista_dezenas: Some(vec!["07".into(), "abc".into()]),
            extra: Map::new(),
        };
        assert_eq!(record.drawn_numbers(), None);
    }

    #[test]
    fn test_record_roundtrip_preserves_extra() {
        let json = r#"{
            "numero": 2650,
            "listaDezenas": ["04", "13", "29", "37", "41", "60"],
            "dataApuracao": "09/01/2024",
            "acumulado": true
        }"#;
        let record: DrawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.numero, 2650);
        assert_eq!(record.extra["dataApuracao"], "09/01/2024");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["acumulado"], serde_json::Value::Bool(true));
        assert_eq!(back["listaDezenas"][0], "04");
    }

    #[test]
    fn test_make_test_records_all_valid() {
        for record in make_test_records(30) {
            let numbers = record.drawn_numbers().expect("dezenas presentes");
            assert_eq!(numbers.len(), PICK_COUNT);
            for n in numbers {
                assert!((1..=BOARD_SIZE).contains(&n));
            }
        }
    }
}
