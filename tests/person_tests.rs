use chrono::{NaiveDate, NaiveDateTime};
use recmap::{
    value, EnumSpec, Error, FieldSpec, FieldType, LeniencyLog, Options, RecordSpec, Session,
    Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const BASE_PERSON: &str = r#"{
    "id": "210282199310100919",
    "name": "cishing",
    "age": "20",
    "sex": 0,
    "address": "xxxxxx",
    "feature": {
        "height": "180cm",
        "weight": "70kg"
    },
    "bornDate": "1993-10-10 12:24:24"
}"#;

const BASE_STUDENT: &str = r#"{
    "id": "210282199310100919",
    "name": "cishing",
    "age": "20",
    "sex": 0,
    "address": "xxxxxx",
    "feature": {
        "height": "180cm",
        "weight": "70kg"
    },
    "bornDate": "2018-08-08 08:08:08",
    "grade": 99.5
}"#;

const BEDROOM: &str = r#"{
    "roomNo": "1227",
    "students": [
        {
            "id": "210282199310100919",
            "name": "cishing",
            "age": "20",
            "sex": 0,
            "address": "xxxxxx",
            "feature": { "height": "180cm", "weight": "70kg" },
            "bornDate": "2018-08-08 08:08:08",
            "grade": 99.5
        },
        {
            "id": "210282199310100919",
            "name": "daming",
            "age": "20",
            "sex": null,
            "feature": { "height": "180cm", "weight": "70kg" },
            "bornDate": "2018-08-08 08:08:08",
            "grade": 99.5
        }
    ],
    "leader": {
        "id": "210282199310100919",
        "name": "leader",
        "age": "20",
        "sex": 0,
        "address": "xxxxxx",
        "feature": { "height": "180cm", "weight": "70kg" },
        "bornDate": "1993-10-10 12:24:24"
    }
}"#;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
enum Sex {
    Man,
    Woman,
    Undefined,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Person {
    id_no: String,
    name: String,
    age: i64,
    sex: Sex,
    address: Option<String>,
    height: String,
    weight: String,
    born_date: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Student {
    #[serde(flatten)]
    person: Person,
    grade: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Bedroom {
    room_no: String,
    students: Vec<Student>,
    leader: Person,
}

fn sex_enum() -> EnumSpec {
    EnumSpec::new("Undefined")
        .with_variant("Man", 0)
        .with_variant("Woman", 1)
        .with_variant("Undefined", 2)
}

fn person_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("id_no", FieldType::String).with_wire_key("id"),
        FieldSpec::required("name", FieldType::String),
        FieldSpec::required("age", FieldType::Int).with_lenient_int(0),
        FieldSpec::required("sex", FieldType::Int)
            .with_enum(sex_enum())
            .with_null_default("Undefined"),
        FieldSpec::optional("address", FieldType::String),
        FieldSpec::required("height", FieldType::String).with_nested(["feature"]),
        FieldSpec::required("weight", FieldType::String).with_nested(["feature"]),
        FieldSpec::required("born_date", FieldType::Date).with_wire_key("bornDate"),
    ]
}

fn person_spec() -> RecordSpec {
    person_fields()
        .into_iter()
        .fold(RecordSpec::new(), RecordSpec::with_field)
}

fn student_spec() -> RecordSpec {
    person_spec().with_field(FieldSpec::required("grade", FieldType::Float))
}

fn bedroom_spec() -> RecordSpec {
    RecordSpec::new()
        .with_field(FieldSpec::required("room_no", FieldType::String).with_wire_key("roomNo"))
        .with_field(FieldSpec::required(
            "students",
            FieldType::list(FieldType::record(student_spec())),
        ))
        .with_field(FieldSpec::required("leader", FieldType::record(person_spec())))
}

fn session() -> Session {
    Session::new(Options::new().with_date_format("%Y-%m-%d %H:%M:%S"))
}

fn date(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn wire(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

fn cishing() -> Person {
    Person {
        id_no: "210282199310100919".to_string(),
        name: "cishing".to_string(),
        age: 20,
        sex: Sex::Man,
        address: Some("xxxxxx".to_string()),
        height: "180cm".to_string(),
        weight: "70kg".to_string(),
        born_date: date(1993, 10, 10, 12, 24, 24),
    }
}

#[test]
fn test_decode_base_person() {
    let person: Person = session().decode(&person_spec(), &wire(BASE_PERSON)).unwrap();
    assert_eq!(person, cishing());
}

#[test]
fn test_encode_person_to_json() {
    let person = Person {
        age: 24,
        address: None,
        ..cishing()
    };
    let encoded = session().encode(&person_spec(), &person).unwrap();
    let json = serde_json::to_string(&encoded).unwrap();
    assert_eq!(
        json,
        r#"{"id":"210282199310100919","name":"cishing","age":"24","sex":0,"address":null,"feature":{"height":"180cm","weight":"70kg"},"bornDate":"1993-10-10 12:24:24"}"#
    );
}

#[test]
fn test_omit_if_absent_drops_key() {
    let spec = RecordSpec::new()
        .with_field(FieldSpec::required("name", FieldType::String))
        .with_field(FieldSpec::optional("address", FieldType::String).with_omit_if_absent());

    #[derive(Serialize)]
    struct Named {
        name: String,
        address: Option<String>,
    }

    let absent = Named {
        name: "cishing".to_string(),
        address: None,
    };
    assert_eq!(
        session().encode(&spec, &absent).unwrap(),
        value!({ "name": "cishing" })
    );

    let present = Named {
        address: Some("xxxxxx".to_string()),
        ..absent
    };
    assert_eq!(
        session().encode(&spec, &present).unwrap(),
        value!({ "name": "cishing", "address": "xxxxxx" })
    );
}

#[test]
fn test_round_trip_person() {
    let session = session();
    let encoded = session.encode(&person_spec(), &cishing()).unwrap();
    let decoded: Person = session.decode(&person_spec(), &encoded).unwrap();
    assert_eq!(decoded, cishing());
}

#[test]
fn test_lenient_fields_recover_and_report() {
    let log = Arc::new(LeniencyLog::new());
    let session = Session::new(
        Options::new()
            .with_date_format("%Y-%m-%d %H:%M:%S")
            .with_observer(log.clone()),
    );

    let mut raw = wire(BASE_PERSON);
    if let Value::Object(obj) = &mut raw {
        obj.insert("age".to_string(), Value::from("not_a_number"));
        obj.insert("sex".to_string(), Value::from(7));
    }

    let person: Person = session.decode(&person_spec(), &raw).unwrap();
    assert_eq!(person.age, 0);
    assert_eq!(person.sex, Sex::Undefined);

    let entries = log.take();
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0].cause, Error::InvalidInteger { ref path, .. } if path == "$.age"));
    assert!(matches!(entries[1].cause, Error::UnknownEnumValue { ref path, .. } if path == "$.sex"));
    assert_eq!(entries[1].substitute, Value::from("Undefined"));
}

#[test]
fn test_null_and_absent_resolve_differently() {
    let mut raw = wire(BASE_PERSON);
    if let Value::Object(obj) = &mut raw {
        obj.insert("sex".to_string(), Value::Null);
        obj.remove("address");
    }
    let person: Person = session().decode(&person_spec(), &raw).unwrap();
    assert_eq!(person.sex, Sex::Undefined);
    assert_eq!(person.address, None);

    if let Value::Object(obj) = &mut raw {
        obj.remove("sex");
    }
    let err = session().decode::<Person>(&person_spec(), &raw).unwrap_err();
    assert!(matches!(err, Error::MissingField { ref path } if path == "$.sex"));
}

#[test]
fn test_structural_errors_carry_paths() {
    let mut raw = wire(BASE_PERSON);
    if let Value::Object(obj) = &mut raw {
        obj.remove("feature");
    }
    let err = session().decode::<Person>(&person_spec(), &raw).unwrap_err();
    assert!(matches!(err, Error::NestedContainerMissing { ref path } if path == "$.feature"));

    let mut raw = wire(BASE_PERSON);
    if let Value::Object(obj) = &mut raw {
        obj.remove("id");
    }
    let err = session().decode::<Person>(&person_spec(), &raw).unwrap_err();
    assert_eq!(err.to_string(), "missing field at $.id");
}

#[test]
fn test_bad_date_is_structural() {
    let mut raw = wire(BASE_PERSON);
    if let Value::Object(obj) = &mut raw {
        obj.insert("bornDate".to_string(), Value::from("10/10/1993"));
    }
    let err = session().decode::<Person>(&person_spec(), &raw).unwrap_err();
    assert!(matches!(err, Error::DateFormat { ref path, .. } if path == "$.bornDate"));
}

#[test]
fn test_decode_student_subtype() {
    let student: Student = session().decode(&student_spec(), &wire(BASE_STUDENT)).unwrap();
    assert_eq!(student.grade, 99.5);
    assert_eq!(student.person.name, "cishing");
    assert_eq!(student.person.born_date, date(2018, 8, 8, 8, 8, 8));
}

#[test]
fn test_decode_bedroom() {
    let bedroom: Bedroom = session().decode(&bedroom_spec(), &wire(BEDROOM)).unwrap();
    assert_eq!(bedroom.room_no, "1227");
    assert_eq!(bedroom.students.len(), 2);
    assert_eq!(bedroom.students[1].person.name, "daming");
    assert_eq!(bedroom.students[1].person.sex, Sex::Undefined);
    assert_eq!(bedroom.students[1].person.address, None);
    assert_eq!(bedroom.leader.name, "leader");
}

#[test]
fn test_bedroom_round_trip() {
    let session = session();
    let bedroom: Bedroom = session.decode(&bedroom_spec(), &wire(BEDROOM)).unwrap();
    let encoded = session.encode(&bedroom_spec(), &bedroom).unwrap();
    let again: Bedroom = session.decode(&bedroom_spec(), &encoded).unwrap();
    assert_eq!(again, bedroom);
    assert_eq!(
        encoded.get("students").and_then(Value::as_array).map(Vec::len),
        Some(2)
    );
}

#[test]
fn test_bedroom_error_path_through_list() {
    let mut raw = wire(BEDROOM);
    if let Value::Object(obj) = &mut raw {
        if let Some(Value::Array(students)) = obj.get_mut("students") {
            students[1] = value!({
                "id": "210282199310100919",
                "name": "daming",
                "age": "20",
                "sex": 1,
                "feature": { "weight": "70kg" },
                "bornDate": "2018-08-08 08:08:08",
                "grade": 80
            });
        }
    }
    let err = session().decode::<Bedroom>(&bedroom_spec(), &raw).unwrap_err();
    assert!(
        matches!(err, Error::MissingField { ref path } if path == "$.students[1].feature.height")
    );
}

#[test]
fn test_invalid_spec_reported() {
    let spec = person_spec()
        .with_field(FieldSpec::required("nick", FieldType::String).with_wire_key("id"));
    let err = session().decode::<Value>(&spec, &wire(BASE_PERSON)).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec(_)));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Counter {
    n: u8,
}

fn counter_spec() -> RecordSpec {
    RecordSpec::new().with_field(FieldSpec::required("n", FieldType::Int).with_wire_key("count"))
}

#[test]
fn test_integer_past_i64_is_mismatch() {
    let raw = wire(r#"{"count": 9223372036854775808}"#);
    let err = session().decode::<Value>(&counter_spec(), &raw).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "$.count"));

    let raw = wire(r#"{"count": 9223372036854775807}"#);
    let decoded: Value = session().decode(&counter_spec(), &raw).unwrap();
    assert_eq!(decoded, value!({ "n": 9_223_372_036_854_775_807i64 }));
}

#[test]
fn test_conversion_errors_carry_paths() {
    let err = session()
        .decode::<Counter>(&counter_spec(), &wire(r#"{"count": 300}"#))
        .unwrap_err();
    assert!(matches!(err, Error::Conversion { ref path, .. } if path == "$.n"));

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Leader {
        leader: Counter,
    }
    let spec = RecordSpec::new().with_field(FieldSpec::required(
        "leader",
        FieldType::record(counter_spec()),
    ));
    let err = session()
        .decode::<Leader>(&spec, &value!({ "leader": { "count": (-1) } }))
        .unwrap_err();
    assert_eq!(err.path(), Some("$.leader.n"));
}

#[test]
fn test_encode_rejects_missing_required_value() {
    #[derive(Serialize)]
    struct Unnamed {
        n: u8,
        name: Option<String>,
    }

    let spec = counter_spec().with_field(FieldSpec::required("name", FieldType::String));
    let err = session()
        .encode(&spec, &Unnamed { n: 1, name: None })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch { ref path, ref found, .. } if path == "$.name" && found == "null"
    ));
}
