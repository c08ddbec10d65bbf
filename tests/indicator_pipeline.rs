//! End-to-end: query -> transport -> classification -> table + metadata -> export.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use ine_indicators::config::ClientConfig;
use ine_indicators::data::{IneResponse, Transport};
use ine_indicators::domain::DimensionFilters;
use ine_indicators::table::Period;
use ine_indicators::{IndicatorQuery, IneClient, IneError};
use serde_json::{Value, json};

/// Serves canned bodies by endpoint and remembers every URL requested.
struct FakeIne {
    data: (u16, String),
    metadata: (u16, String),
    seen: RefCell<Vec<String>>,
}

impl FakeIne {
    fn new(data: Value, metadata: Value) -> Self {
        Self {
            data: (200, data.to_string()),
            metadata: (200, metadata.to_string()),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for FakeIne {
    fn get(&self, url: &str, timeout: Duration) -> Result<IneResponse, IneError> {
        assert_eq!(timeout, Duration::from_secs(20));
        self.seen.borrow_mut().push(url.to_string());
        let (status, body) = if url.contains("pindicaMeta.jsp") {
            &self.metadata
        } else {
            &self.data
        };
        Ok(IneResponse::new(*status, url, body.clone()))
    }
}

fn population_data() -> Value {
    json!([{
        "IndicadorCod": "0006341",
        "IndicadorDsg": "Resident population (No.) by Place of residence (NUTS - 2013) and Sex; Annual",
        "MetaInfUrl": "https://www.ine.pt/bddXplorer/htdocs/minfo.jsp?var_cd=0006341&lingua=EN",
        "DataExtracao": "2024-06-01T09:00:00.000+01:00",
        "DataUltimoAtualizacao": "2024-06-14",
        "UltimoPref": "2022",
        "Dados": {
            "2022": [
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "T", "dim_3_t": "HM", "valor": "10467366"},
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "1", "dim_3_t": "H", "valor": "4993604"},
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "2", "dim_3_t": "M", "valor": "5473762"},
                {"geocod": "11", "geodsg": "Norte", "dim_3": "T", "dim_3_t": "HM", "valor": "3592163"}
            ],
            "2021": [
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "T", "dim_3_t": "HM", "valor": "10421117"},
                {"geocod": "11", "geodsg": "Norte", "dim_3": "T", "dim_3_t": "HM"}
            ]
        }
    }])
}

fn population_metadata() -> Value {
    json!([{
        "IndicadorCod": "0006341",
        "IndicadorNome": "Resident population (No.) by Place of residence (NUTS - 2013) and Sex; Annual",
        "Periodic": "Annual",
        "PrimeiroPeriodo": "2011",
        "UltimoPeriodo": "2022",
        "UnidadeMedida": "No.",
        "Potencia10": "0",
        "PrecisaoDecimal": "0",
        "Lingua": "EN",
        "DataExtracao": "2024-06-01T09:00:01.000+01:00",
        "Dimensoes": {
            "Descricao_Dim": [
                {"dim_num": "1", "abrv": "Data reference period"},
                {"dim_num": "2", "abrv": "Place of residence (NUTS - 2013)"},
                {"dim_num": "3", "abrv": "Sex"}
            ],
            "Categoria_Dim": [{
                "Dim_Num1_S7A2022": [{"categ_cod": "S7A2022", "categ_dsg": "2022"}],
                "Dim_Num1_S7A2021": [{"categ_cod": "S7A2021", "categ_dsg": "2021"}],
                "Dim_Num2_PT": [{"categ_cod": "PT", "categ_dsg": "Portugal"}],
                "Dim_Num2_11": [{"categ_cod": "11", "categ_dsg": "Norte"}],
                "Dim_Num3_T": [{"categ_cod": "T", "categ_dsg": "HM"}],
                "Dim_Num3_1": [{"categ_cod": "1", "categ_dsg": "H"}],
                "Dim_Num3_2": [{"categ_cod": "2", "categ_dsg": "M"}]
            }]
        }
    }])
}

fn client(fake: FakeIne) -> IneClient<FakeIne> {
    IneClient::new(fake, ClientConfig::default())
}

#[test]
fn fetch_0006341_defaults_dimension_one() {
    let c = client(FakeIne::new(population_data(), population_metadata()));
    let indicator = c.get_indicator(&IndicatorQuery::for_code("0006341")).unwrap();

    let seen = c.transport().seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].contains("pindica.jsp?op=2&varcd=0006341&lang=EN&Dim1=T"));
    assert!(seen[1].contains("pindicaMeta.jsp?varcd=0006341&lang=EN"));

    assert_eq!(indicator.periodicity(), Some("Annual"));
    assert_eq!(indicator.first_period(), Some("2011-01-01"));
    assert_eq!(indicator.last_period(), Some("2022-01-01"));
    assert_eq!(indicator.geo_level(), Some("nuts-2013"));
    assert_eq!(indicator.unit(), Some("No."));

    let table = indicator.table();
    assert_eq!(table.shape(), (2, 6));
    assert_eq!(table.column_names(), ["Location", "Sex"]);
    let y2022 = Period::Date(chrono::NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    assert_eq!(table.value(&y2022, &["Norte", "HM"]), Some(3_592_163.0));
}

#[test]
fn flatten_and_repivot_recovers_every_value() {
    let c = client(FakeIne::new(population_data(), population_metadata()));
    let indicator = c.get_indicator(&IndicatorQuery::for_code("0006341")).unwrap();
    let table = indicator.table();

    let records = indicator.to_records();
    assert_eq!(records.len(), table.shape().0 * table.shape().1);

    let repivoted: HashMap<(String, Vec<String>), Option<f64>> = records
        .into_iter()
        .map(|r| {
            let labels = r.levels.into_iter().map(|(_, label)| label).collect();
            ((r.period, labels), r.value)
        })
        .collect();

    let mut non_missing = 0;
    for (row, period) in table.rows().iter().enumerate() {
        for (col, labels) in table.columns().iter().enumerate() {
            let back = repivoted[&(period.to_string(), labels.clone())];
            assert_eq!(back, table.cell(row, col));
            if back.is_some() {
                non_missing += 1;
            }
        }
    }
    assert_eq!(non_missing, 5);
}

#[test]
fn missing_values_export_as_null_not_zero() {
    let c = client(FakeIne::new(population_data(), population_metadata()));
    let json = c
        .get_indicator(&IndicatorQuery::for_code("0006341"))
        .unwrap()
        .to_json()
        .unwrap();

    let records = json["data"].as_array().unwrap();
    let norte_2021 = records
        .iter()
        .find(|r| r["Location"] == "Norte" && r["Sex"] == "HM" && r["Period"] == "2021-01-01")
        .unwrap();
    assert!(norte_2021["Value"].is_null());
    assert!(records.iter().all(|r| r["Value"] != 0.0));
    assert_eq!(json["source"], "INE");
    assert_eq!(json["extraction_date"]["metadata"], "2024-06-01T09:00:01.000+01:00");
}

#[test]
fn filter_pins_dimension_in_request_and_table() {
    let c = client(FakeIne::new(population_data(), population_metadata()));
    let filters = DimensionFilters::new().with("Dim3", "1").unwrap();
    let indicator = c
        .get_indicator(&IndicatorQuery::for_code("0006341").with_filters(filters))
        .unwrap();

    assert!(c.transport().seen.borrow()[0].ends_with("Dim3=1&Dim1=T"));
    assert_eq!(indicator.table().shape(), (2, 2));
    assert_eq!(indicator.table().count_values(), 1);
}

#[test]
fn semantic_rejection_on_200_is_reported() {
    let rejected = json!([{"Sucesso": {"Falso": [{"Msg": "The indicator code is not valid"}]}}]);
    let c = client(FakeIne::new(rejected, population_metadata()));
    let err = c.get_indicator(&IndicatorQuery::for_code("9999999")).unwrap_err();

    assert!(matches!(err, IneError::SemanticApi { .. }));
    assert!(err.to_string().contains("The indicator code is not valid"));
    // The metadata request is never sent.
    assert_eq!(c.transport().seen.borrow().len(), 1);
}

#[test]
fn http_failure_is_distinct_from_semantic_failure() {
    let mut fake = FakeIne::new(population_data(), population_metadata());
    fake.metadata = (502, "Bad Gateway".to_string());
    let c = client(fake);
    let err = c.get_indicator(&IndicatorQuery::for_code("0006341")).unwrap_err();
    assert!(matches!(err, IneError::HttpStatus { status: 502, .. }));
}

#[test]
fn prefetched_payloads_skip_the_network() {
    let c = client(FakeIne::new(json!([]), json!([])));
    let query = IndicatorQuery::from_payloads(population_data(), population_metadata());
    let indicator = c.get_indicator(&query).unwrap();
    assert!(c.transport().seen.borrow().is_empty());
    assert_eq!(indicator.code(), Some("0006341"));
}

#[test]
fn unmatched_filter_is_a_caller_error() {
    let c = client(FakeIne::new(population_data(), population_metadata()));
    let filters = DimensionFilters::new().with("Dim3", "9").unwrap();
    let err = c
        .get_indicator(&IndicatorQuery::for_code("0006341").with_filters(filters))
        .unwrap_err();
    assert!(matches!(err, IneError::Validation(_)));
}

#[test]
fn non_numeric_values_export_as_null() {
    let data = json!([{
        "IndicadorCod": "0006341",
        "Dados": {
            "2022": [
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "T", "dim_3_t": "HM", "valor": 10467366},
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "1", "dim_3_t": "H", "valor": "x"},
                {"geocod": "PT", "geodsg": "Portugal", "dim_3": "2", "dim_3_t": "M", "valor": "..."},
                {"geocod": "11", "geodsg": "Norte", "dim_3": "T", "dim_3_t": "HM", "valor": ""},
                {"geocod": "11", "geodsg": "Norte", "dim_3": "1", "dim_3_t": "H", "valor": null}
            ]
        }
    }]);
    let c = client(FakeIne::new(json!([]), json!([])));
    let indicator = c
        .get_indicator(&IndicatorQuery::from_payloads(data, population_metadata()))
        .unwrap();
    let json = indicator.to_json().unwrap();
    let records = json["data"].as_array().unwrap();

    let value_of = |location: &str, sex: &str| {
        records
            .iter()
            .find(|r| r["Location"] == location && r["Sex"] == sex)
            .map(|r| r["Value"].clone())
            .unwrap()
    };
    assert_eq!(value_of("Portugal", "HM"), json!(10467366.0));
    for (location, sex) in [("Portugal", "H"), ("Portugal", "M"), ("Norte", "HM"), ("Norte", "H")] {
        assert!(value_of(location, sex).is_null(), "{location}/{sex}");
    }
    assert_eq!(indicator.table().count_values(), 1);
}
