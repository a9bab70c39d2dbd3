//! Default dataset adopted on first run.
//!
//! Six funding-agency portals, one per category, all stamped 2024-01-15 so that seeding is
//! deterministic.

use crate::domain::Dashboard;
use chrono::{TimeZone, Utc};

const SEED: [(&str, &str, &str, &str, &str); 6] = [
    (
        "1",
        "Portal de Editais CNPq",
        "Acesso direto ao portal de editais do Conselho Nacional de Desenvolvimento Científico e Tecnológico",
        "https://www.gov.br/cnpq/pt-br/acesso-a-informacao/acoes-e-programas/programas/programa-de-bolsas-de-mestrado-e-doutorado",
        "CNPq",
    ),
    (
        "2",
        "Editais CAPES",
        "Portal de editais da Coordenação de Aperfeiçoamento de Pessoal de Nível Superior",
        "https://www.gov.br/capes/pt-br/acesso-a-informacao/acoes-e-programas/bolsas",
        "CAPES",
    ),
    (
        "3",
        "FAPESP - Fundação de Amparo à Pesquisa",
        "Editais e oportunidades da Fundação de Amparo à Pesquisa do Estado de São Paulo",
        "https://fapesp.br/oportunidades",
        "FAPESP",
    ),
    (
        "4",
        "Portal de Editais MCTI",
        "Ministério da Ciência, Tecnologia e Inovações - Editais e oportunidades",
        "https://www.gov.br/mcti/pt-br/acesso-a-informacao/acoes-e-programas/editais",
        "MCTI",
    ),
    (
        "5",
        "FINEP - Financiadora de Estudos e Projetos",
        "Editais e programas de financiamento da FINEP",
        "https://www.gov.br/finep/pt-br/acesso-a-informacao/acoes-e-programas",
        "FINEP",
    ),
    (
        "6",
        "BNDES - Banco Nacional de Desenvolvimento",
        "Programas de apoio e editais do BNDES",
        "https://www.bndes.gov.br/wps/portal/site/home/transparencia/contratos-e-convenios",
        "BNDES",
    ),
];

/// Returns a fresh copy of the default dataset.
#[must_use]
pub fn seed_dashboards() -> Vec<Dashboard> {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single().unwrap_or_default();

    SEED.iter()
        .map(|&(id, title, description, url, category)| Dashboard {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            category: Some(category.to_string()),
            created_at: stamp,
            updated_at: stamp,
        })
        .collect()
}
