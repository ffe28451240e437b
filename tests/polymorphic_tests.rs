use recmap::{
    decode_array_polymorphic, value, Error, FieldSpec, FieldType, LeniencyLog, Options,
    Polymorphism, RecordSpec, Session, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DRINKS: &str = r#"{
    "drinks": [
        {
            "type": "water",
            "description": "All natural"
        },
        {
            "type": "orange_juice",
            "description": "Best drank with breakfast"
        },
        {
            "type": "beer",
            "description": "An alcoholic beverage, best drunk on fridays after work",
            "alcohol_content": "5%"
        }
    ]
}"#;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct DrinkBase {
    #[serde(rename = "type")]
    kind: String,
    description: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Beer {
    #[serde(flatten)]
    base: DrinkBase,
    alcohol_content: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
enum Drink {
    Base(DrinkBase),
    Beer(Beer),
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Menu {
    drinks: Vec<Drink>,
}

fn drink_spec() -> RecordSpec {
    RecordSpec::new()
        .with_field(FieldSpec::required("type", FieldType::String))
        .with_field(FieldSpec::required("description", FieldType::String))
        .with_polymorphism(
            Polymorphism::new("type", "Base")
                .with_base_tag("water")
                .with_base_tag("orange_juice")
                .with_subtype(
                    "beer",
                    "Beer",
                    RecordSpec::new()
                        .with_field(FieldSpec::required("alcohol_content", FieldType::String)),
                ),
        )
}

fn menu_spec() -> RecordSpec {
    RecordSpec::new().with_field(FieldSpec::required(
        "drinks",
        FieldType::list(FieldType::record(drink_spec())),
    ))
}

fn base(kind: &str, description: &str) -> DrinkBase {
    DrinkBase {
        kind: kind.to_string(),
        description: description.to_string(),
    }
}

#[test]
fn test_decode_drinks_in_order() {
    let wire: Value = serde_json::from_str(DRINKS).unwrap();
    let drinks: Vec<Drink> =
        decode_array_polymorphic(&drink_spec(), wire.get("drinks").unwrap()).unwrap();

    assert_eq!(
        drinks,
        vec![
            Drink::Base(base("water", "All natural")),
            Drink::Base(base("orange_juice", "Best drank with breakfast")),
            Drink::Beer(Beer {
                base: base(
                    "beer",
                    "An alcoholic beverage, best drunk on fridays after work"
                ),
                alcohol_content: "5%".to_string(),
            }),
        ]
    );
}

#[test]
fn test_polymorphic_list_inside_record() {
    let wire: Value = serde_json::from_str(DRINKS).unwrap();
    let session = Session::default();
    let menu: Menu = session.decode(&menu_spec(), &wire).unwrap();
    assert_eq!(menu.drinks.len(), 3);
    assert!(matches!(&menu.drinks[2], Drink::Beer(beer) if beer.alcohol_content == "5%"));

    let encoded = session.encode(&menu_spec(), &menu).unwrap();
    assert_eq!(encoded, wire);
}

#[test]
fn test_unmapped_tag_degrades_with_warning() {
    let log = Arc::new(LeniencyLog::new());
    let session = Session::new(Options::new().with_observer(log.clone()));
    let wire = value!([
        { "type": "soda", "description": "Fizzy", "sugar": "lots" },
        { "type": "water", "description": "All natural" }
    ]);

    let drinks: Vec<Drink> = session.decode_array_polymorphic(&drink_spec(), &wire).unwrap();
    assert_eq!(drinks[0], Drink::Base(base("soda", "Fizzy")));

    let entries = log.take();
    assert_eq!(entries.len(), 1);
    assert!(matches!(
        entries[0].cause,
        Error::UnknownDiscriminator { ref path, ref value } if path == "$[0].type" && value == "\"soda\""
    ));
}

#[test]
fn test_subtype_missing_extra_field() {
    let wire = value!([{ "type": "beer", "description": "Lager" }]);
    let err = decode_array_polymorphic::<Drink>(&drink_spec(), &wire).unwrap_err();
    assert!(matches!(err, Error::MissingField { ref path } if path == "$[0].alcohol_content"));
}

#[test]
fn test_encode_uses_variant_tag() {
    let beer = Drink::Beer(Beer {
        base: base("water", "Stout"),
        alcohol_content: "7%".to_string(),
    });
    let wire = Session::default().encode(&drink_spec(), &beer).unwrap();
    assert_eq!(
        wire,
        value!({ "type": "beer", "description": "Stout", "alcohol_content": "7%" })
    );
}

#[test]
fn test_plain_spec_cannot_decode_polymorphic_array() {
    let spec = RecordSpec::new().with_field(FieldSpec::required("type", FieldType::String));
    let err = decode_array_polymorphic::<Value>(&spec, &value!([])).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec(_)));
}

#[test]
fn test_discriminator_must_be_base_field() {
    let spec = RecordSpec::new()
        .with_field(FieldSpec::required("description", FieldType::String))
        .with_polymorphism(Polymorphism::new("type", "Base"));
    let err = decode_array_polymorphic::<Value>(&spec, &value!([])).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec(_)));
}

#[test]
fn test_non_array_input() {
    let err = decode_array_polymorphic::<Drink>(&drink_spec(), &value!({})).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref expected, .. } if expected == "array"));
}

#[test]
fn test_encode_emits_discriminator_before_base_fields() {
    let spec = RecordSpec::new()
        .with_field(FieldSpec::required("description", FieldType::String))
        .with_field(FieldSpec::required("type", FieldType::String))
        .with_polymorphism(Polymorphism::new("type", "Base").with_subtype(
            "beer",
            "Beer",
            RecordSpec::new().with_field(FieldSpec::required("alcohol_content", FieldType::String)),
        ));
    let drink = Drink::Beer(Beer {
        base: base("beer", "best on fridays"),
        alcohol_content: "5%".to_string(),
    });

    let session = Session::new(Options::new());
    let encoded = session.encode(&spec, &drink).unwrap();
    let text = serde_json::to_string(&encoded).unwrap();
    assert_eq!(
        text,
        r#"{"type":"beer","description":"best on fridays","alcohol_content":"5%"}"#
    );
    let back: Drink = session.decode(&spec, &encoded).unwrap();
    assert_eq!(back, drink);
}

#[test]
fn test_base_variant_with_subtype_tag_is_rejected() {
    let drink = Drink::Base(base("beer", "no alcohol content given"));
    let err = Session::new(Options::new())
        .encode(&drink_spec(), &drink)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "$.type"));
}
