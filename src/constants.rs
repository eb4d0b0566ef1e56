/// Placeholder written for any missing or unparseable text field.
/// The web application reads and displays this exact value.
pub const UNDEFINED: &str = "Indefinido";

/// Minimum similarity (0-100) for a fuzzy correction to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 85;

// Default locations, overridable through config.toml
pub const DEFAULT_SPREADSHEET_PATH: &str = "planilhageral.xlsx";
pub const DEFAULT_SHEETS: [&str; 2] = ["2005-2013", "2014-2025"];
pub const DEFAULT_GEO_CACHE_PATH: &str = "dados_municipios_estados_ibge.json";
pub const DEFAULT_IBGE_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Firestore collections
pub const PROJECTS_COLLECTION: &str = "projetos";
pub const STATE_AGGREGATES_COLLECTION: &str = "dadosEstados";

// Fixed values on every imported project
pub const PROJECT_STATUS: &str = "aprovado";
pub const PROJECT_ACTIVE: bool = false;
pub const PROJECT_COMPLIANCE: bool = true;

// Canonical law names used by the web application
pub const LAW_CULTURE: &str = "Lei de Incentivo à Cultura";
pub const LAW_PROAC: &str = "PROAC - Programa de Ação Cultural";
pub const LAW_FIA: &str = "FIA - Lei Fundo para a Infância e Adolescência";
pub const LAW_SPORT: &str = "LIE - Lei de Incentivo ao Esporte";
pub const LAW_ELDERLY: &str = "Lei da Pessoa Idosa";
pub const LAW_PRONAS: &str =
    "Pronas - Programa Nacional de Apoio à Atenção da Saúde da Pessoa com Deficiência";
pub const LAW_PRONON: &str = "Pronon - Programa Nacional de Apoio à Atenção Oncológica";
pub const LAW_PROMAC: &str =
    "Promac - Programa de Incentivo à Cultura do Município de São Paulo";
pub const LAW_ICMS_MG: &str = "ICMS - MG Imposto sobre Circulação de Mercadoria e Serviços";
pub const LAW_ICMS_MG_SPORT: &str =
    "ICMS - MG Imposto sobre Circulação de Mercadoria e Serviços (Esporte)";
pub const LAW_ICMS_MG_CULTURE: &str =
    "ICMS - MG Imposto sobre Circulação de Mercadoria e Serviços (Cultura)";
pub const LAW_ICMS_RJ: &str = "ICMS - RJ Imposto sobre Circulação de Mercadoria e Serviços";
pub const LAW_ICMS_RJ_SPORT: &str =
    "ICMS - RJ Imposto sobre Circulação de Mercadoria e Serviços (Esporte)";
pub const LAW_ICMS_RJ_CULTURE: &str =
    "ICMS - RJ Imposto sobre Circulação de Mercadoria e Serviços (Cultura)";
pub const LAW_PIE: &str = "PIE - Lei Paulista de Incentivo ao Esporte";

/// The 27 federative units, in the order the state aggregate documents are seeded.
pub const BRAZILIAN_STATES: [&str; 27] = [
    "Acre",
    "Alagoas",
    "Amapá",
    "Amazonas",
    "Bahia",
    "Ceará",
    "Distrito Federal",
    "Espírito Santo",
    "Goiás",
    "Maranhão",
    "Mato Grosso",
    "Mato Grosso do Sul",
    "Minas Gerais",
    "Pará",
    "Paraíba",
    "Paraná",
    "Pernambuco",
    "Piauí",
    "Rio de Janeiro",
    "Rio Grande do Norte",
    "Rio Grande do Sul",
    "Rondônia",
    "Roraima",
    "Santa Catarina",
    "São Paulo",
    "Sergipe",
    "Tocantins",
];
