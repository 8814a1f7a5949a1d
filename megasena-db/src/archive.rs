use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::models::DrawRecord;

/// Todos os concursos conhecidos, indexados pelo número do concurso.
/// Único artefato durável do programa: um JSON com chaves em ordem
/// numérica crescente, reescrito por inteiro a cada atualização.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    records: BTreeMap<u32, DrawRecord>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: DrawRecord) {
        self.records.insert(record.numero, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_id(&self) -> Option<u32> {
        self.records.keys().next_back().copied()
    }

    pub fn get(&self, id: u32) -> Option<&DrawRecord> {
        self.records.get(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = &DrawRecord> {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.keys().copied()
    }
}

impl FromIterator<DrawRecord> for Archive {
    fn from_iter<T: IntoIterator<Item = DrawRecord>>(iter: T) -> Self {
        let mut archive = Archive::new();
        for record in iter {
            archive.insert(record);
        }
        archive
    }
}

pub fn archive_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("megasena.json");
    path
}

pub fn save_archive(archive: &Archive, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Não foi possível criar o diretório {:?}", parent))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Não foi possível criar {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &archive.records)
        .context("Falha ao gravar o arquivo de sorteios")?;
    Ok(())
}

pub fn load_archive(path: &Path) -> Result<Archive> {
    let file = File::open(path)
        .with_context(|| format!("Não foi possível abrir {:?}", path))?;
    let records: BTreeMap<u32, DrawRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Arquivo de sorteios inválido: {:?}", path))?;
    Ok(Archive { records })
}
