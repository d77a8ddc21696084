//! Rankings, the national aggregate and the municipal snapshot.
//!
//! All sorts are stable: entities with equal values keep the order they
//! have in the source rows.

use sinaloa_report_analytics_models::{
    CrimeValues, EntityRow, MunicipalRow, MunicipalSnapshot, RankedEntry, RankingTable,
    SnapshotStats,
};
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::states::clave_for;
use sinaloa_report_geography_models::{NATIONAL_CLAVE, NATIONAL_NAME, names_match};
use sinaloa_report_source_models::{CrimeRecord, PopulationTable};

use crate::metrics::rate_per_100k;
use crate::monthly::{PERIOD_COLUMN, STATE_COLUMN, sum_rows, unique_periods};

/// Default length of ranking tables.
pub const DEFAULT_TOP_N: usize = 10;

/// Number of municipalities highlighted in the municipal snapshot.
pub const HIGHLIGHTED_MUNICIPALITIES: usize = 3;

/// Column holding the municipality name in municipal datasets.
pub const MUNICIPALITY_COLUMN: &str = "Municipio";

/// Column holding the year of a state row.
pub const YEAR_COLUMN: &str = "Año";

const ALT_STATE_COLUMN: &str = "Entidad";

/// State name of a row, from `Estado` or else `Entidad`.
#[must_use]
pub fn state_name(row: &CrimeRecord) -> &str {
    match row.text(STATE_COLUMN) {
        "" => row.text(ALT_STATE_COLUMN),
        name => name,
    }
}

/// Sorts `(name, value)` pairs by value, highest first, and keeps the
/// first `n`. Entries whose name matches `highlight` are flagged.
#[must_use]
pub fn top_n(mut entries: Vec<(String, f64)>, n: usize, highlight: Option<&str>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(index, (name, value))| RankedEntry {
            rank: index + 1,
            highlighted: highlight.is_some_and(|h| names_match(h, &name)),
            name,
            value,
        })
        .collect()
}

fn ranking_tables_with(
    rows: &[CrimeRecord],
    crime: CrimeType,
    n: usize,
    highlight: Option<&str>,
    value: impl Fn(&CrimeRecord) -> f64,
) -> Vec<RankingTable> {
    unique_periods(rows)
        .into_iter()
        .filter_map(|period| {
            let entries: Vec<(String, f64)> = rows
                .iter()
                .filter(|row| row.text(PERIOD_COLUMN) == period && !state_name(row).is_empty())
                .map(|row| (state_name(row).to_owned(), value(row)))
                .collect();
            if entries.is_empty() {
                return None;
            }
            Some(RankingTable {
                period,
                crime,
                entries: top_n(entries, n, highlight),
            })
        })
        .collect()
}

/// One top-`n` table of states per period, ranked on `crime`.
///
/// Rows without a state name are excluded.
#[must_use]
pub fn ranking_tables(
    rows: &[CrimeRecord],
    crime: CrimeType,
    n: usize,
    highlight: Option<&str>,
) -> Vec<RankingTable> {
    ranking_tables_with(rows, crime, n, highlight, |row| row.crime(crime))
}

/// Like [`ranking_tables`], ranked on the rate per 100k of each state for
/// the row's `Año` (or the year of its period).
#[must_use]
pub fn rate_ranking_tables(
    rows: &[CrimeRecord],
    population: &PopulationTable,
    crime: CrimeType,
    n: usize,
    highlight: Option<&str>,
) -> Vec<RankingTable> {
    ranking_tables_with(rows, crime, n, highlight, |row| {
        row_rate(row, population, crime)
    })
}

fn row_year(row: &CrimeRecord) -> Option<u16> {
    row.text(YEAR_COLUMN)
        .trim()
        .parse()
        .ok()
        .or_else(|| row.period().map(sinaloa_report_crime_models::Period::year))
}

fn row_clave(row: &CrimeRecord) -> Option<u32> {
    clave_for(state_name(row)).or_else(|| row.text("Clave_Entidad").trim().parse().ok())
}

fn row_rate(row: &CrimeRecord, population: &PopulationTable, crime: CrimeType) -> f64 {
    let pop = match (row_clave(row), row_year(row)) {
        (Some(clave), Some(year)) => population.population(clave, year),
        _ => None,
    };
    if pop.is_none() {
        log::debug!("No population for {} ({})", state_name(row), row.text(PERIOD_COLUMN));
    }
    rate_per_100k(row.crime(crime), pop)
}

fn crime_values(row: &CrimeRecord) -> CrimeValues {
    CrimeType::all().iter().map(|&c| (c, row.crime(c))).collect()
}

/// One [`EntityRow`] per state row.
#[must_use]
pub fn state_rows(rows: &[CrimeRecord]) -> Vec<EntityRow> {
    rows.iter()
        .filter(|row| !state_name(row).is_empty())
        .map(|row| EntityRow {
            name: state_name(row).to_owned(),
            clave: row_clave(row),
            values: crime_values(row),
        })
        .collect()
}

/// State rows converted to rates per 100k for `year`.
#[must_use]
pub fn state_rate_rows(
    rows: &[CrimeRecord],
    population: &PopulationTable,
    year: u16,
) -> Vec<EntityRow> {
    state_rows(rows)
        .into_iter()
        .map(|mut row| {
            let pop = row.clave.and_then(|clave| population.population(clave, year));
            for value in row.values.values_mut() {
                *value = rate_per_100k(*value, pop);
            }
            row
        })
        .collect()
}

/// Sum of every state row as a `NACIONAL` row with clave 0.
#[must_use]
pub fn national_aggregate(rows: &[CrimeRecord]) -> EntityRow {
    EntityRow {
        name: NATIONAL_NAME.to_owned(),
        clave: Some(NATIONAL_CLAVE),
        values: sum_rows(rows.iter()),
    }
}

/// [`national_aggregate`] converted to rates with the national population
/// of `year`.
#[must_use]
pub fn national_rates(rows: &[CrimeRecord], population: &PopulationTable, year: u16) -> EntityRow {
    let mut national = national_aggregate(rows);
    let pop = population.population(NATIONAL_CLAVE, year);
    if pop.is_none() {
        log::warn!("No national population for {year}; national rates are zero");
    }
    for value in national.values.values_mut() {
        *value = rate_per_100k(*value, pop);
    }
    national
}

/// The national row first, then states sorted by `Total` descending.
#[must_use]
pub fn national_comparison(national: EntityRow, mut states: Vec<EntityRow>) -> Vec<EntityRow> {
    let total = |row: &EntityRow| row.values.get(&CrimeType::Total).copied().unwrap_or(0.0);
    states.sort_by(|a, b| total(b).total_cmp(&total(a)));
    std::iter::once(national).chain(states).collect()
}

/// Municipalities of `period`, sorted by `Total` with the top three
/// highlighted. The stats describe the `crime` column.
#[must_use]
pub fn municipal_snapshot(rows: &[CrimeRecord], period: &str, crime: CrimeType) -> MunicipalSnapshot {
    let mut period_rows: Vec<&CrimeRecord> = rows
        .iter()
        .filter(|row| row.text(PERIOD_COLUMN) == period)
        .collect();
    period_rows.sort_by(|a, b| b.crime(CrimeType::Total).total_cmp(&a.crime(CrimeType::Total)));

    let mut stats = SnapshotStats {
        total: 0.0,
        affected: 0,
        max_municipality: None,
        max_value: 0.0,
    };
    for row in rows.iter().filter(|row| row.text(PERIOD_COLUMN) == period) {
        let value = row.crime(crime);
        if value > 0.0 {
            stats.total += value;
            stats.affected += 1;
        }
        if value > stats.max_value {
            stats.max_value = value;
            stats.max_municipality = Some(row.text(MUNICIPALITY_COLUMN).to_owned());
        }
    }

    MunicipalSnapshot {
        period: period.to_owned(),
        rows: period_rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| MunicipalRow {
                rank: index + 1,
                municipality: row.text(MUNICIPALITY_COLUMN).to_owned(),
                values: crime_values(row),
                highlighted: index < HIGHLIGHTED_MUNICIPALITIES,
            })
            .collect(),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::approx;

    fn state(name: &str, period: &str, total: &str) -> CrimeRecord {
        CrimeRecord::from_pairs(&[
            ("Estado", name),
            ("Periodo", period),
            ("Año", "2024"),
            ("Total", total),
        ])
    }

    #[test]
    fn top_n_is_stable_for_ties() {
        let entries = vec![
            ("E1".to_owned(), 5.0),
            ("E2".to_owned(), 3.0),
            ("E3".to_owned(), 5.0),
            ("E4".to_owned(), 1.0),
        ];
        let top = top_n(entries, 2, None);
        assert_eq!(top.len(), 2);
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"E1"));
        assert!(names.contains(&"E3"));
        assert!(top.iter().all(|e| approx(e.value, 5.0)));
        // stable: input order wins
        assert_eq!(names, vec!["E1", "E3"]);
        assert_eq!(top[1].rank, 2);
    }

    #[test]
    fn ranking_tables_skip_blank_states_and_flag_highlight() {
        let rows = vec![
            state("Sonora", "Enero 2024", "50"),
            state("", "Enero 2024", "999"),
            state("Sinaloa", "Enero 2024", "120"),
            state("Sinaloa", "Febrero 2024", "90"),
        ];
        let tables = ranking_tables(&rows, CrimeType::Total, 10, Some("Sinaloa"));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].period, "Enero 2024");
        assert_eq!(tables[0].entries.len(), 2);
        assert_eq!(tables[0].entries[0].name, "Sinaloa");
        assert!(tables[0].entries[0].highlighted);
        assert!(!tables[0].entries[1].highlighted);
    }

    #[test]
    fn rate_rankings_use_row_year_population() {
        let mut population = PopulationTable::new();
        population.insert(25, 2024, 3_000_000);
        population.insert(26, 2024, 500_000);

        let rows = vec![
            state("Sinaloa", "Enero 2024", "150"),
            state("Sonora", "Enero 2024", "50"),
        ];
        let tables = rate_ranking_tables(&rows, &population, CrimeType::Total, 10, None);
        let entries = &tables[0].entries;
        assert_eq!(entries[0].name, "Sonora");
        assert!(approx(entries[0].value, 10.0));
        assert!(approx(entries[1].value, 5.0));
    }

    #[test]
    fn national_aggregate_sums_states_and_leads_comparison() {
        let rows = vec![
            CrimeRecord::from_pairs(&[("Estado", "Sonora"), ("Total", "40"), ("Feminicidio", "2")]),
            CrimeRecord::from_pairs(&[("Estado", "Sinaloa"), ("Total", "60"), ("Feminicidio", "x")]),
        ];
        let national = national_aggregate(&rows);
        assert_eq!(national.name, "NACIONAL");
        assert_eq!(national.clave, Some(0));
        assert!(approx(national.values[&CrimeType::Total], 100.0));
        assert!(approx(national.values[&CrimeType::Feminicidio], 2.0));

        let table = national_comparison(national, state_rows(&rows));
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["NACIONAL", "Sinaloa", "Sonora"]);
        assert_eq!(table[1].clave, Some(25));
    }

    #[test]
    fn national_rates_divide_by_national_population() {
        let mut population = PopulationTable::new();
        population.insert(0, 2025, 1_000_000);
        let rows = vec![CrimeRecord::from_pairs(&[("Estado", "Sinaloa"), ("Total", "25")])];
        let national = national_rates(&rows, &population, 2025);
        assert!(approx(national.values[&CrimeType::Total], 2.5));

        let missing = national_rates(&rows, &PopulationTable::new(), 2025);
        assert!(approx(missing.values[&CrimeType::Total], 0.0));
    }

    #[test]
    fn municipal_snapshot_sorts_and_summarizes() {
        let row = |name: &str, doloso: &str, total: &str| {
            CrimeRecord::from_pairs(&[
                ("Municipio", name),
                ("Periodo", "Enero 2024"),
                ("Homicidio doloso", doloso),
                ("Total", total),
            ])
        };
        let rows = vec![
            row("Navolato", "8", "10"),
            row("Culiacán", "70", "80"),
            row("Choix", "0", "0"),
            row("Mazatlán", "8", "12"),
            row("Ahome", "5", "6"),
        ];
        let snapshot = municipal_snapshot(&rows, "Enero 2024", CrimeType::HomicidioDoloso);
        let order: Vec<_> = snapshot.rows.iter().map(|r| r.municipality.as_str()).collect();
        assert_eq!(order, vec!["Culiacán", "Mazatlán", "Navolato", "Ahome", "Choix"]);
        assert!(snapshot.rows[2].highlighted);
        assert!(!snapshot.rows[3].highlighted);

        assert!(approx(snapshot.stats.total, 91.0));
        assert_eq!(snapshot.stats.affected, 4);
        assert_eq!(snapshot.stats.max_municipality.as_deref(), Some("Culiacán"));
        assert!(approx(snapshot.stats.max_value, 70.0));
    }
}
