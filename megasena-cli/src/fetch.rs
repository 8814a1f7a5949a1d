use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use reqwest::blocking::Client;

use megasena_db::archive::{load_archive, save_archive, Archive};
use megasena_db::models::DrawRecord;

const BASE_URL: &str = "https://servicebus2.caixa.gov.br/portaldeloterias/api/megasena/";
const MAX_RETRIES: u32 = 20;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const FETCH_WORKERS: usize = 16;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// O portal da Caixa não entrega a cadeia de certificados completa; sem
/// desativar a validação TLS o handshake falha. A exceção vale apenas
/// para este cliente.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Não foi possível criar o cliente HTTP")
}

/// Consulta do concurso mais recente. Sem esta resposta não há intervalo
/// de download, então a falha aqui é fatal.
pub fn fetch_latest(client: &Client) -> Result<DrawRecord> {
    let record: DrawRecord = client
        .get(BASE_URL)
        .send()
        .context("Falha ao consultar o último concurso")?
        .error_for_status()
        .context("A API recusou a consulta do último concurso")?
        .json()
        .context("Resposta inválida para o último concurso")?;
    if record.numero == 0 {
        bail!("O último concurso veio com número zero");
    }
    Ok(record)
}

/// Busca um concurso com até 20 tentativas e 1s entre elas. O chamador
/// trata o esgotamento como não fatal: o concurso fica fora do arquivo.
pub fn fetch_draw(client: &Client, id: u32) -> Result<DrawRecord> {
    let url = format!("{BASE_URL}{id}");
    let mut last_error = None;

    for _ in 0..MAX_RETRIES {
        match try_fetch(client, &url) {
            Ok(record) => return Ok(record),
            Err(e) => {
                last_error = Some(e);
                std::thread::sleep(RETRY_DELAY);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("Concurso {id}: tentativas esgotadas")))
}

fn try_fetch(client: &Client, url: &str) -> Result<DrawRecord> {
    let record = client
        .get(url)
        .send()?
        .error_for_status()?
        .json::<DrawRecord>()?;
    Ok(record)
}

/// Baixa todos os concursos de 1 até o mais recente com um pool limitado
/// de workers. A ordem de chegada não importa: o arquivo é indexado pelo
/// número do concurso e só é gravado depois que o pool drena por completo.
pub fn fetch_archive(client: &Client) -> Result<Archive> {
    let latest = fetch_latest(client)?;
    let last_id = latest.numero;
    println!("Último concurso: {last_id}. Baixando {} sorteios...", last_id - 1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(FETCH_WORKERS)
        .build()
        .context("Não foi possível criar o pool de download")?;

    let bar = ProgressBar::new(u64::from(last_id - 1));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let fetched: Vec<DrawRecord> = pool.install(|| {
        (1..last_id)
            .into_par_iter()
            .filter_map(|id| {
                let result = fetch_draw(client, id);
                bar.inc(1);
                match result {
                    Ok(record) => Some(record),
                    Err(e) => {
                        bar.println(format!("Concurso {id} descartado: {e}"));
                        None
                    }
                }
            })
            .collect()
    });
    bar.finish_with_message("Download concluído");

    let mut archive: Archive = fetched.into_iter().collect();
    archive.insert(latest);
    Ok(archive)
}

/// Carrega o arquivo persistido, a menos que `force` peça uma atualização
/// ou o arquivo não exista; nesses casos baixa tudo e regrava o JSON.
pub fn load_or_fetch(path: &Path, force: bool) -> Result<Archive> {
    if !force {
        if let Ok(archive) = load_archive(path) {
            if !archive.is_empty() {
                println!("Arquivo carregado: {} sorteios de {}", archive.len(), path.display());
                return Ok(archive);
            }
        }
    }

    let client = build_client()?;
    let archive = fetch_archive(&client)?;
    save_archive(&archive, path)?;
    println!("Arquivo salvo em {}", path.display());
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
    }

    #[test]
    fn test_base_url_shape() {
        assert!(BASE_URL.ends_with('/'));
        let url = format!("{BASE_URL}{}", 2650);
        assert!(url.ends_with("/megasena/2650"));
    }

    #[test]
    fn test_load_or_fetch_uses_existing_file() {
        use megasena_db::models::make_test_records;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("megasena.json");
        let archive: Archive = make_test_records(8).into_iter().collect();
        save_archive(&archive, &path).unwrap();

        // Com o arquivo presente e sem `force`, nada de rede é tocado
        let loaded = load_or_fetch(&path, false).unwrap();
        assert_eq!(loaded.len(), 8);
    }
}
