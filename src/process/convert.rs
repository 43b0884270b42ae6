use crate::process::columns::ColumnMap;
use crate::process::month::parse_month;
use crate::process::utils::{clean_str, parse_number, parse_whole_number};
use crate::process::RawTable;
use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// What a missing text cell becomes in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingText {
    /// An empty field.
    #[default]
    Empty,
    /// The literal `nan` older exports carried.
    Placeholder,
}

impl MissingText {
    fn fill(self) -> &'static str {
        match self {
            MissingText::Empty => "",
            MissingText::Placeholder => "nan",
        }
    }
}

/// One normalized output row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRecord {
    pub estacion: String,
    pub anio: i64,
    pub mes: Option<u32>,
    pub codigo_estacion: String,
    pub departamento: String,
    pub trafico_total: f64,
}

/// Output columns, in order.
pub fn output_schema() -> Schema {
    Schema::new(vec![
        Field::new("estacion", DataType::Utf8, false),
        Field::new("anio", DataType::Int64, false),
        Field::new("mes", DataType::Int64, true),
        Field::new("codigo_estacion", DataType::Utf8, false),
        Field::new("departamento", DataType::Utf8, false),
        Field::new("trafico_total", DataType::Float64, false),
    ])
}

fn text(cell: Option<&str>, missing: MissingText) -> String {
    match cell {
        Some(s) => clean_str(s),
        None => missing.fill().to_string(),
    }
}

/// Normalize a single input row. Rows without a usable year give `None`.
pub fn normalize_row(
    row: &[Option<String>],
    columns: &ColumnMap,
    missing: MissingText,
) -> Option<TrafficRecord> {
    let cell = |i: usize| row.get(i).and_then(|c| c.as_deref());

    let anio = cell(columns.year).and_then(parse_whole_number)?;
    Some(TrafficRecord {
        estacion: text(cell(columns.station), missing),
        anio,
        mes: cell(columns.month).and_then(parse_month),
        codigo_estacion: text(cell(columns.station_code), missing),
        departamento: text(cell(columns.department), missing),
        trafico_total: cell(columns.total_traffic)
            .and_then(parse_number)
            .unwrap_or(0.0),
    })
}

/// Normalize every row of `table`, dropping those without a year.
pub fn normalize_rows(
    table: &RawTable,
    columns: &ColumnMap,
    missing: MissingText,
) -> Vec<TrafficRecord> {
    table
        .rows
        .iter()
        .filter_map(|row| normalize_row(row, columns, missing))
        .collect()
}

/// Build the output batch in the fixed column order.
pub fn to_record_batch(records: &[TrafficRecord]) -> Result<RecordBatch> {
    let n = records.len();
    let mut estacion = StringBuilder::new();
    let mut anio = Int64Builder::with_capacity(n);
    let mut mes = Int64Builder::with_capacity(n);
    let mut codigo = StringBuilder::new();
    let mut departamento = StringBuilder::new();
    let mut total = Float64Builder::with_capacity(n);

    for r in records {
        estacion.append_value(&r.estacion);
        anio.append_value(r.anio);
        mes.append_option(r.mes.map(i64::from));
        codigo.append_value(&r.codigo_estacion);
        departamento.append_value(&r.departamento);
        total.append_value(r.trafico_total);
    }

    let cols: Vec<ArrayRef> = vec![
        Arc::new(estacion.finish()),
        Arc::new(anio.finish()),
        Arc::new(mes.finish()),
        Arc::new(codigo.finish()),
        Arc::new(departamento.finish()),
        Arc::new(total.finish()),
    ];
    RecordBatch::try_new(Arc::new(output_schema()), cols).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, Int64Array, StringArray};

    fn columns() -> ColumnMap {
        ColumnMap {
            station: 0,
            year: 1,
            month: 2,
            station_code: 3,
            department: 4,
            total_traffic: 5,
        }
    }

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn normalizes_full_row() {
        let r = row(&[
            Some(" Station A "),
            Some("2021"),
            Some("Marzo"),
            Some("E1"),
            Some("Lima"),
            Some("1500"),
        ]);
        let rec = normalize_row(&r, &columns(), MissingText::Empty).unwrap();
        assert_eq!(
            rec,
            TrafficRecord {
                estacion: "Station A".into(),
                anio: 2021,
                mes: Some(3),
                codigo_estacion: "E1".into(),
                departamento: "Lima".into(),
                trafico_total: 1500.0,
            }
        );
    }

    #[test]
    fn blank_or_bad_year_drops_row() {
        for year in [None, Some(""), Some("   "), Some("n/a"), Some("2021.5")] {
            let r = row(&[
                Some("X"),
                year,
                Some("Enero"),
                Some("E1"),
                Some("Cusco"),
                Some("10"),
            ]);
            assert!(normalize_row(&r, &columns(), MissingText::Empty).is_none());
        }
    }

    #[test]
    fn bad_total_becomes_zero_and_bad_month_null() {
        let r = row(&[
            Some("X"),
            Some("2020"),
            Some("foo"),
            Some("E1"),
            Some("Cusco"),
            Some("mil"),
        ]);
        let rec = normalize_row(&r, &columns(), MissingText::Empty).unwrap();
        assert_eq!(rec.trafico_total, 0.0);
        assert_eq!(rec.mes, None);
    }

    #[test]
    fn missing_text_policy() {
        let r = row(&[None, Some("2020"), None, None, None, None]);
        let empty = normalize_row(&r, &columns(), MissingText::Empty).unwrap();
        assert_eq!(empty.estacion, "");
        assert_eq!(empty.departamento, "");
        assert_eq!(empty.trafico_total, 0.0);

        let legacy = normalize_row(&r, &columns(), MissingText::Placeholder).unwrap();
        assert_eq!(legacy.estacion, "nan");
        assert_eq!(legacy.codigo_estacion, "nan");
        assert_eq!(legacy.mes, None);
    }

    #[test]
    fn short_rows_read_as_missing() {
        let r = row(&[Some("X"), Some("2020")]);
        let rec = normalize_row(&r, &columns(), MissingText::Empty).unwrap();
        assert_eq!(rec.trafico_total, 0.0);
        assert_eq!(rec.codigo_estacion, "");
    }

    #[test]
    fn batch_has_fixed_schema() -> Result<()> {
        let recs = vec![
            TrafficRecord {
                estacion: "A".into(),
                anio: 2021,
                mes: Some(1),
                codigo_estacion: "E1".into(),
                departamento: "Lima".into(),
                trafico_total: 10.5,
            },
            TrafficRecord {
                estacion: "B".into(),
                anio: 2022,
                mes: None,
                codigo_estacion: "E2".into(),
                departamento: "Ica".into(),
                trafico_total: 0.0,
            },
        ];
        let batch = to_record_batch(&recs)?;
        let names: Vec<_> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            [
                "estacion",
                "anio",
                "mes",
                "codigo_estacion",
                "departamento",
                "trafico_total"
            ]
        );
        assert_eq!(batch.num_rows(), 2);

        let mes = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(mes.value(0), 1);
        assert!(mes.is_null(1));
        let est = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(est.value(1), "B");
        let total = batch.column(5).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(total.null_count(), 0);
        Ok(())
    }
}
