//! Round trips of every datatype through the in-memory engine.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use prodrisk_api::{get_attribute_value, set_attribute, AttributeKey, Engine, MemoryEngine};
use prodrisk_core::{
    Curve, Datatype, LabelledCurve, ProdriskError, StochasticSeries, TimeSeries, Value, XyRecord,
};

fn hour(h: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(h)
}

fn engine() -> MemoryEngine {
    let engine = MemoryEngine::new()
        .with_object_type(
            "plant",
            &[
                ("outlet_line", "int"),
                ("n_units", "int_array"),
                ("max_prod", "double"),
                ("max_discharge", "double_array"),
                ("owner", "string"),
                ("unit_names", "string_array"),
                ("tailrace_curve", "xy"),
                ("labels", "sy"),
                ("turb_eff", "xy_array"),
                ("energy_price", "txy"),
                ("inflow", "txy_stochastic"),
                ("legacy", "matrix"),
            ],
        )
        .with_horizon("20220101000000", "20220101030000", "hour");
    engine.add_object("plant", "P1").unwrap();
    engine
}

fn read(engine: &MemoryEngine, attribute: &str) -> Option<Value> {
    let datatype = datatype_of(engine, attribute);
    get_attribute_value(engine, &AttributeKey::new("plant", "P1", attribute), &datatype).unwrap()
}

fn write(engine: &MemoryEngine, attribute: &str, value: impl Into<Value>) -> Result<(), ProdriskError> {
    let datatype = datatype_of(engine, attribute);
    set_attribute(
        engine,
        &AttributeKey::new("plant", "P1", attribute),
        &datatype,
        value.into(),
    )
}

fn datatype_of(engine: &MemoryEngine, attribute: &str) -> Datatype {
    let names = engine.object_type_attribute_names("plant").unwrap();
    let tags = engine.object_type_attribute_datatypes("plant").unwrap();
    let position = names.iter().position(|n| n == attribute).unwrap();
    Datatype::from_tag(&tags[position])
}

#[test]
fn unset_attributes_read_as_absent() {
    let engine = engine();
    for attribute in [
        "outlet_line",
        "n_units",
        "max_prod",
        "max_discharge",
        "unit_names",
        "tailrace_curve",
        "labels",
        "turb_eff",
        "energy_price",
        "inflow",
    ] {
        assert_eq!(read(&engine, attribute), None, "{attribute}");
    }
}

#[test]
fn sentinel_values_read_as_absent() {
    let engine = engine();
    let int_key = AttributeKey::new("plant", "P1", "outlet_line");
    engine.set_int_value(&int_key, -32767).unwrap();
    assert_eq!(read(&engine, "outlet_line"), None);
    engine.set_int_value(&int_key, -32766).unwrap();
    assert_eq!(read(&engine, "outlet_line"), Some(Value::Int(-32766)));

    let double_key = AttributeKey::new("plant", "P1", "max_prod");
    engine.set_double_value(&double_key, -1e37).unwrap();
    assert_eq!(read(&engine, "max_prod"), None);
}

#[test]
fn scalars_and_arrays_pass_through() {
    let engine = engine();
    write(&engine, "outlet_line", 3).unwrap();
    write(&engine, "max_prod", 120.5).unwrap();
    write(&engine, "owner", "Statkraft").unwrap();
    write(&engine, "max_discharge", vec![10.0, 20.0]).unwrap();
    write(&engine, "unit_names", vec!["G1".to_string(), "G2".to_string()]).unwrap();

    assert_eq!(read(&engine, "outlet_line"), Some(Value::Int(3)));
    assert_eq!(read(&engine, "max_prod"), Some(Value::Double(120.5)));
    assert_eq!(read(&engine, "owner"), Some(Value::String("Statkraft".into())));
    assert_eq!(
        read(&engine, "max_discharge"),
        Some(Value::DoubleArray(vec![10.0, 20.0]))
    );
    assert_eq!(
        read(&engine, "unit_names"),
        Some(Value::StringArray(vec!["G1".into(), "G2".into()]))
    );
}

#[test]
fn scalars_are_coerced_to_the_attribute_datatype() {
    let engine = engine();
    write(&engine, "n_units", 2).unwrap();
    assert_eq!(read(&engine, "n_units"), Some(Value::IntArray(vec![2])));

    write(&engine, "max_discharge", vec![1i64, 2]).unwrap();
    assert_eq!(read(&engine, "max_discharge"), Some(Value::DoubleArray(vec![1.0, 2.0])));

    write(&engine, "outlet_line", 4.0).unwrap();
    assert_eq!(read(&engine, "outlet_line"), Some(Value::Int(4)));
    assert!(matches!(
        write(&engine, "outlet_line", 4.5),
        Err(ProdriskError::TypeMismatch { .. })
    ));

    write(&engine, "max_prod", 7).unwrap();
    assert_eq!(read(&engine, "max_prod"), Some(Value::Double(7.0)));
}

#[test]
fn unknown_datatype_reads_as_absent_and_ignores_writes() {
    let engine = engine();
    assert_eq!(datatype_of(&engine, "legacy"), Datatype::Unknown("matrix".into()));
    assert_eq!(read(&engine, "legacy"), None);
    write(&engine, "legacy", 1.0).unwrap();
}

#[test]
fn xy_curve_round_trip_keeps_engine_order() {
    let engine = engine();
    let curve = Curve::new(90.0, vec![(10.0, 0.9), (0.0, 0.8), (20.0, 0.95)]);
    write(&engine, "tailrace_curve", curve.clone()).unwrap();
    assert_eq!(read(&engine, "tailrace_curve"), Some(Value::Xy(curve)));
}

#[test]
fn xy_record_writes_as_curve() {
    let engine = engine();
    let record: XyRecord =
        serde_json::from_str(r#"{"ref": 5.0, "xy": [[0.0, 1.0], [2.0, 3.0]]}"#).unwrap();
    write(&engine, "tailrace_curve", record).unwrap();
    assert_eq!(
        read(&engine, "tailrace_curve"),
        Some(Value::Xy(Curve::new(5.0, vec![(0.0, 1.0), (2.0, 3.0)])))
    );
}

#[test]
fn sy_curve_round_trip() {
    let engine = engine();
    let curve =
        LabelledCurve::from_parts(vec!["low".into(), "high".into()], &[1.0, 2.0]).unwrap();
    write(&engine, "labels", curve.clone()).unwrap();
    assert_eq!(read(&engine, "labels"), Some(Value::Sy(curve)));
}

#[test]
fn xy_array_round_trip_slices_by_point_counts() {
    let engine = engine();
    let curves = vec![
        Curve::new(100.0, vec![(0.0, 0.0), (1.0, 1.1)]),
        Curve::new(110.0, vec![(0.0, 0.0), (1.0, 1.1), (2.0, 2.2)]),
    ];
    write(&engine, "turb_eff", curves.clone()).unwrap();

    let key = AttributeKey::new("plant", "P1", "turb_eff");
    assert_eq!(engine.get_xy_curve_array_n_points(&key).unwrap(), vec![2, 3]);
    assert_eq!(read(&engine, "turb_eff"), Some(Value::XyArray(curves)));
}

#[test]
fn xy_array_accepts_structured_records() {
    let engine = engine();
    let records = vec![
        XyRecord {
            reference: 100.0,
            xy: vec![[0.0, 0.0], [1.0, 1.1]],
        },
        XyRecord {
            reference: 110.0,
            xy: vec![[0.0, 0.0]],
        },
    ];
    write(&engine, "turb_eff", records).unwrap();

    let value = read(&engine, "turb_eff").unwrap();
    let curves = value.as_curves().unwrap();
    assert_eq!(curves.len(), 2);
    assert_eq!(curves[0].points, vec![(0.0, 0.0), (1.0, 1.1)]);
    assert_eq!(curves[1].reference, 110.0);
}

#[test]
fn empty_xy_array_write_is_a_no_op() {
    let engine = engine();
    write(&engine, "turb_eff", vec![Curve::new(1.0, vec![(0.0, 1.0)])]).unwrap();
    write(&engine, "turb_eff", Vec::<Curve>::new()).unwrap();
    assert_eq!(
        read(&engine, "turb_eff"),
        Some(Value::XyArray(vec![Curve::new(1.0, vec![(0.0, 1.0)])]))
    );
}

#[test]
fn txy_round_trip_uses_hour_offsets() {
    let engine = engine();
    let series = TimeSeries::new(
        "energy_price",
        vec![(hour(0), 30.0), (hour(1), 35.0), (hour(49), 32.0)],
    );
    write(&engine, "energy_price", series.clone()).unwrap();

    let key = AttributeKey::new("plant", "P1", "energy_price");
    assert_eq!(engine.get_txy_series_t(&key).unwrap(), vec![0, 1, 49]);
    assert_eq!(
        engine.get_txy_series_start_time(&key).unwrap(),
        "20220101000000"
    );
    assert_eq!(read(&engine, "energy_price"), Some(Value::Txy(series)));
}

#[test]
fn off_grid_and_duplicate_timestamps_are_rejected() {
    let engine = engine();
    for offset in [Duration::minutes(30), Duration::minutes(15)] {
        let series = TimeSeries::new(
            "energy_price",
            vec![(hour(0), 1.0), (hour(0) + offset, 2.0), (hour(2), 3.0)],
        );
        assert!(matches!(
            write(&engine, "energy_price", series),
            Err(ProdriskError::Precondition(_))
        ));
    }

    let duplicated = TimeSeries::new(
        "energy_price",
        vec![(hour(0), 1.0), (hour(1), 2.0), (hour(1), 3.0)],
    );
    assert!(matches!(
        write(&engine, "energy_price", duplicated),
        Err(ProdriskError::Precondition(_))
    ));
    assert_eq!(read(&engine, "energy_price"), None);
}

#[test]
fn stochastic_series_is_detected_by_value_count() {
    let engine = engine();
    let series = StochasticSeries::new(
        "inflow",
        vec![hour(0), hour(24)],
        vec![vec![1.0, 10.0, 100.0], vec![2.0, 20.0, 200.0]],
    );
    write(&engine, "inflow", series.clone()).unwrap();

    let key = AttributeKey::new("plant", "P1", "inflow");
    assert_eq!(
        engine.get_txy_series_y(&key).unwrap(),
        vec![1.0, 2.0, 10.0, 20.0, 100.0, 200.0]
    );
    let read_back = read(&engine, "inflow").unwrap();
    let stochastic = read_back.as_stochastic().unwrap();
    assert_eq!(stochastic, &series);
    assert_eq!(stochastic.n_scenarios(), 3);
    assert_eq!(stochastic.scenario(1), Some(vec![10.0, 20.0]));
}

#[test]
fn ragged_stochastic_rows_are_rejected() {
    let engine = engine();
    let series = StochasticSeries::new(
        "inflow",
        vec![hour(0), hour(1)],
        vec![vec![1.0, 2.0], vec![3.0]],
    );
    assert!(matches!(
        write(&engine, "inflow", series),
        Err(ProdriskError::Precondition(_))
    ));
}

#[test]
fn out_of_range_txy_offsets_are_a_shape_error() {
    let engine = engine();
    let key = AttributeKey::new("plant", "P1", "energy_price");
    engine
        .set_txy_series(&key, "20220101000000", &[0, i64::MAX / 1000], &[1.0, 2.0])
        .unwrap();

    let err = get_attribute_value(&engine, &key, &Datatype::Txy).unwrap_err();
    assert!(matches!(err, ProdriskError::Shape(_)));
}

#[test]
fn txy_read_requires_hour_unit() {
    let engine = MemoryEngine::new()
        .with_object_type("plant", &[("energy_price", "txy")])
        .with_horizon("20220101000000", "20220102000000", "minute");
    engine.add_object("plant", "P1").unwrap();
    let key = AttributeKey::new("plant", "P1", "energy_price");
    engine
        .set_txy_series(&key, "20220101000000", &[0, 60], &[1.0, 2.0])
        .unwrap();

    let err = get_attribute_value(&engine, &key, &Datatype::Txy).unwrap_err();
    assert!(matches!(err, ProdriskError::UnexpectedTimeUnit(unit) if unit == "minute"));
}

#[test]
fn constant_is_broadcast_over_the_horizon() {
    let engine = engine();
    write(&engine, "energy_price", 42.0).unwrap();

    let key = AttributeKey::new("plant", "P1", "energy_price");
    assert_eq!(engine.get_txy_series_t(&key).unwrap(), vec![0, 1, 2]);
    assert_eq!(engine.get_txy_series_y(&key).unwrap(), vec![42.0; 3]);
}

#[test]
fn constant_broadcast_over_sub_hour_grid_is_rejected() {
    let engine = MemoryEngine::new()
        .with_object_type("plant", &[("energy_price", "txy")])
        .with_horizon("20220101000000", "20220101030000", "minute")
        .with_time_resolution(&[0, 60], &[15.0, 60.0]);
    engine.add_object("plant", "P1").unwrap();
    let key = AttributeKey::new("plant", "P1", "energy_price");
    assert!(matches!(
        set_attribute(&engine, &key, &Datatype::Txy, Value::Double(1.0)),
        Err(ProdriskError::Precondition(_))
    ));
}
