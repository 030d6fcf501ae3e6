use careflow_core::error::PipelineError;
use careflow_core::transform::transform;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use polars::prelude::*;

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn sample_raw() -> DataFrame {
    df!(
        "patient_id" => &[1i64, 2, 3],
        "department" => &["ER", "ER", "ICU"],
        "dob" => &[Some("2000-01-01"), None, Some("1990-01-01")],
        "billing_amount" => &[Some(100.0f64), None, None],
    )
    .unwrap()
}

fn billing(df: &DataFrame) -> Vec<Option<f64>> {
    df.column("billing_amount")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn age_is_floor_of_day_span_over_year_length() {
    let df = df!(
        "patient_id" => &[1i64],
        "department" => &["ER"],
        "dob" => &["1995-06-15"],
        "billing_amount" => &[Some(50.0f64)],
    )
    .unwrap();

    let out = transform(&df, reference()).expect("transform succeeded");
    let age = out.clean.column("age").unwrap().i64().unwrap().get(0).unwrap();

    let dob = NaiveDate::from_ymd_opt(1995, 6, 15).unwrap();
    let days = (reference().date_naive() - dob).num_days() as f64;
    assert_eq!(age, (days / 365.25).floor() as i64);
}

#[test]
fn null_or_unparseable_dob_yields_age_zero() {
    let df = df!(
        "patient_id" => &[1i64, 2],
        "department" => &["ER", "ER"],
        "dob" => &[None::<&str>, Some("not-a-date")],
        "billing_amount" => &[Some(10.0f64), Some(20.0f64)],
    )
    .unwrap();

    let out = transform(&df, reference()).expect("transform succeeded");
    let ages: Vec<Option<i64>> = out.clean.column("age").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(ages, vec![Some(0), Some(0)]);
}

#[test]
fn nulls_filled_with_rounded_mean_of_originally_present_values() {
    let df = df!(
        "patient_id" => &[1i64, 2, 3, 4],
        "department" => &["A", "A", "A", "A"],
        "dob" => &["2000-01-01", "2000-01-01", "2000-01-01", "2000-01-01"],
        "billing_amount" => &[Some(10.0f64), Some(20.0), Some(25.0), None],
    )
    .unwrap();

    let out = transform(&df, reference()).expect("transform succeeded");
    // mean of {10, 20, 25} = 18.333..., rounded to 18.33; the filled value
    // must not feed back into the imputation basis.
    assert_eq!(
        billing(&out.clean),
        vec![Some(10.0), Some(20.0), Some(25.0), Some(18.33)]
    );
}

#[test]
fn imputation_is_scoped_per_department() {
    let df = df!(
        "patient_id" => &[1i64, 2, 3, 4],
        "department" => &["A", "B", "A", "B"],
        "dob" => &["2000-01-01", "2000-01-01", "2000-01-01", "2000-01-01"],
        "billing_amount" => &[Some(10.0f64), Some(100.0), None, None],
    )
    .unwrap();

    let out = transform(&df, reference()).expect("transform succeeded");
    assert_eq!(
        billing(&out.clean),
        vec![Some(10.0), Some(100.0), Some(10.0), Some(100.0)]
    );
}

#[test]
fn all_null_department_stays_null() {
    let out = transform(&sample_raw(), reference()).expect("transform succeeded");

    // ICU has no non-null source value; no crash, no fabricated zero.
    assert_eq!(billing(&out.clean)[2], None);

    let avg = out
        .summary
        .column("average_billing")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(avg.get(1), None);
}

#[test]
fn summary_counts_sums_and_averages_per_department() {
    let out = transform(&sample_raw(), reference()).expect("transform succeeded");
    let summary = &out.summary;

    // Pinned output order: sorted ascending by department name.
    let departments: Vec<Option<&str>> =
        summary.column("department").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(departments, vec![Some("ER"), Some("ICU")]);

    let counts: Vec<Option<i64>> = summary
        .column("number_of_patients")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(counts, vec![Some(2), Some(1)]);

    let totals: Vec<Option<f64>> =
        summary.column("total_revenue").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(totals, vec![Some(200.0), Some(0.0)]);

    let averages: Vec<Option<f64>> = summary
        .column("average_billing")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(averages, vec![Some(100.0), None]);
}

#[test]
fn end_to_end_sample_dataset() {
    let out = transform(&sample_raw(), reference()).expect("transform succeeded");

    let ages: Vec<Option<i64>> =
        out.clean.column("age").unwrap().i64().unwrap().into_iter().collect();
    // 2000-01-01 is exactly 8766 days before the reference (24.0 years);
    // 1990-01-01 is 12418 days (33.998... years), so the floor is 33.
    assert_eq!(ages, vec![Some(24), Some(0), Some(33)]);

    assert_eq!(billing(&out.clean), vec![Some(100.0), Some(100.0), None]);
}

#[test]
fn row_count_order_and_passthrough_columns_preserved() {
    let df = df!(
        "patient_id" => &[3i64, 1, 2],
        "name" => &["Chen Wei", "Alice Carter", "Brian Okafor"],
        "department" => &["ICU", "ER", "ER"],
        "dob" => &["1990-01-01", "2000-01-01", "1985-03-20"],
        "billing_amount" => &[Some(1.0f64), Some(2.0), Some(3.0)],
    )
    .unwrap();

    let out = transform(&df, reference()).expect("transform succeeded");
    assert_eq!(out.clean.height(), 3);

    let ids: Vec<Option<i64>> =
        out.clean.column("patient_id").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);

    let names: Vec<Option<&str>> =
        out.clean.column("name").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(
        names,
        vec![Some("Chen Wei"), Some("Alice Carter"), Some("Brian Okafor")]
    );
}

#[test]
fn transform_is_deterministic_for_fixed_input_and_reference() {
    let raw = sample_raw();
    let first = transform(&raw, reference()).expect("first run succeeded");
    let second = transform(&raw, reference()).expect("second run succeeded");

    assert!(first.clean.equals_missing(&second.clean));
    assert!(first.summary.equals_missing(&second.summary));
}

#[test]
fn missing_required_column_is_fatal() {
    let df = df!(
        "patient_id" => &[1i64],
        "department" => &["ER"],
        "dob" => &["2000-01-01"],
    )
    .unwrap();

    let err = transform(&df, reference()).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}
