//! IBGE municipality codes of the state capitals, as used by Querido Diário.

/// `(name as written in the reference CSVs, IBGE code)`.
pub const CAPITALS: &[(&str, &str)] = &[
    ("Aracaju (SE)", "2800308"),
    ("Belo Horizonte (MG)", "3106200"),
    ("Belém (PA)", "1501402"),
    ("Boa Vista (RR)", "1400100"),
    ("Brasília (DF)", "5300108"),
    ("Campo Grande (MS)", "5002704"),
    ("Cuiabá (MT)", "5103403"),
    ("Curitiba (PR)", "4106902"),
    ("Florianópolis (SC)", "4205407"),
    ("Fortaleza (CE)", "2304400"),
    ("Goiânia (GO)", "5208707"),
    ("João Pessoa (PB)", "2507507"),
    ("Macapá (AP)", "1600303"),
    ("Maceió (AL)", "2704302"),
    ("Manaus (AM)", "1302603"),
    ("Natal (RN)", "2408102"),
    ("Palmas (TO)", "1721000"),
    ("Porto Alegre (RS)", "4314902"),
    ("Porto Velho (RO)", "1100205"),
    ("Recife (PE)", "2611606"),
    ("Rio Branco (AC)", "1200401"),
    ("Rio de Janeiro (RJ)", "3304557"),
    ("Salvador (BA)", "2927408"),
    ("São Luís (MA)", "2111300"),
    ("São Paulo (SP)", "3550308"),
    ("Teresina (PI)", "2211001"),
    ("Vitória (ES)", "3205309"),
];

/// IBGE code for a capital written as `Name (UF)`.
///
/// Case and surrounding whitespace are ignored; the bare name without the
/// state suffix is accepted too.
pub fn capital_ibge_code(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    CAPITALS.iter().find_map(|&(capital, code)| {
        let capital = capital.to_lowercase();
        let bare = capital.split(" (").next().unwrap_or(&capital);
        (capital == wanted || bare == wanted).then_some(code)
    })
}
