//! EIP-712 Type Encoding
//!
//! Implements `encodeType`, `encodeData` and friends on top of the head/tail
//! ABI encoder.

use super::types::*;
use crate::abi::{
    hex_to_bytes, is_array_type, is_hex_string, numeric_payload, raw_encode_types, to_buffer, AbiValue,
    SolidityType,
};
use crate::error::{TypedDataError, TypedDataResult};
use crate::utils::crypto::keccak256;
use serde_json::Value;
use std::collections::BTreeSet;

/// Strip everything after the leading identifier, e.g. `Person[][2]` -> `Person`
fn base_type_name(type_name: &str) -> &str {
    let end = type_name
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(type_name.len());
    &type_name[..end]
}

/// Find all struct types reachable from `primary_type`, including itself.
///
/// Array suffixes are stripped before lookup and names that are not declared
/// in `types` are skipped, so an undeclared primary type yields an empty set.
pub fn find_type_dependencies(primary_type: &str, types: &MessageTypes) -> BTreeSet<String> {
    let mut results = BTreeSet::new();
    let mut to_visit = vec![base_type_name(primary_type).to_string()];

    while let Some(current) = to_visit.pop() {
        if results.contains(&current) {
            continue;
        }
        let Some(fields) = types.get(&current) else {
            continue;
        };
        for field in fields {
            let dependency = base_type_name(&field.type_name);
            if !results.contains(dependency) {
                to_visit.push(dependency.to_string());
            }
        }
        results.insert(current);
    }

    results
}

/// Encode the canonical type string: the primary type, then its
/// dependencies in ascending name order.
/// Format: "TypeName(type1 name1,type2 name2,...)"
pub fn encode_type(primary_type: &str, types: &MessageTypes) -> TypedDataResult<String> {
    let mut dependencies = find_type_dependencies(primary_type, types);
    dependencies.remove(primary_type);

    let mut result = String::new();
    for type_name in std::iter::once(primary_type).chain(dependencies.iter().map(String::as_str)) {
        let fields = types
            .get(type_name)
            .ok_or_else(|| TypedDataError::NoTypeDefinition(type_name.to_string()))?;
        result.push_str(&format_type_string(type_name, fields));
    }

    Ok(result)
}

fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn hash_type(primary_type: &str, types: &MessageTypes) -> TypedDataResult<[u8; 32]> {
    Ok(keccak256(encode_type(primary_type, types)?.as_bytes()))
}

/// Encode one field into the `(type, value)` pair handed to the ABI encoder.
///
/// The type string is parsed once into a [`SolidityType`], treating declared
/// names as struct references. `value` is `None` when the field is absent
/// from its parent object. Nested structs, dynamic leaves and arrays come
/// back as `bytes32` hashes; other primitives are passed through untouched.
pub fn encode_field(
    types: &MessageTypes,
    name: &str,
    type_name: &str,
    value: Option<&Value>,
    version: SignTypedDataVersion,
) -> TypedDataResult<(SolidityType, AbiValue)> {
    let missing = || TypedDataError::MissingFieldValue {
        name: name.to_string(),
        type_name: type_name.to_string(),
    };

    let field_type = match SolidityType::parse_with(type_name, &|n: &str| types.contains_key(n)) {
        Ok(field_type) => field_type,
        // An absent value or a V3 array is reported ahead of a bad type
        Err(_) if value.is_none() => return Err(missing()),
        Err(_) if version == SignTypedDataVersion::V3 && is_array_type(type_name) => {
            return Err(TypedDataError::ArraysUnimplemented)
        }
        Err(e) => return Err(e),
    };

    match (&field_type, value) {
        (SolidityType::Struct(_), _) => encode_typed_field(types, &field_type, value, version),
        (_, None) => Err(missing()),
        (_, Some(value)) => encode_typed_field(types, &field_type, Some(value), version),
    }
}

/// Dispatch on a parsed field type. Array elements recurse here without
/// re-parsing their type.
fn encode_typed_field(
    types: &MessageTypes,
    field_type: &SolidityType,
    value: Option<&Value>,
    version: SignTypedDataVersion,
) -> TypedDataResult<(SolidityType, AbiValue)> {
    if let SolidityType::Struct(struct_name) = field_type {
        let absent = matches!(value, None | Some(Value::Null));
        let hash = if version == SignTypedDataVersion::V4 && absent {
            [0u8; 32]
        } else {
            hash_struct(struct_name, value, types, version)?
        };
        return Ok(bytes32(hash));
    }

    let value = value.ok_or_else(|| TypedDataError::invalid_value(&field_type.to_string(), "undefined"))?;

    match field_type {
        SolidityType::Bytes => {
            let payload = match value {
                Value::Number(_) => numeric_payload(&AbiValue::from(value))?,
                Value::String(s) if is_hex_string(s) => hex_to_bytes(s)?,
                Value::String(s) => s.as_bytes().to_vec(),
                Value::Array(_) => to_buffer(&AbiValue::from(value))?,
                other => return Err(TypedDataError::invalid_value("bytes", other)),
            };
            Ok(bytes32(keccak256(&payload)))
        }

        SolidityType::String => {
            let payload = match value {
                Value::Number(_) => numeric_payload(&AbiValue::from(value))?,
                Value::Null => Vec::new(),
                Value::String(s) => s.as_bytes().to_vec(),
                other => return Err(TypedDataError::invalid_value("string", other)),
            };
            Ok(bytes32(keccak256(&payload)))
        }

        SolidityType::Array(..) if version == SignTypedDataVersion::V3 => {
            Err(TypedDataError::ArraysUnimplemented)
        }

        SolidityType::Array(element_type, _) => {
            let items = value
                .as_array()
                .ok_or_else(|| TypedDataError::NotAnArray(field_type.to_string()))?;

            let mut element_types = Vec::with_capacity(items.len());
            let mut element_values = Vec::with_capacity(items.len());
            for item in items {
                let (t, v) = encode_typed_field(types, element_type, Some(item), version)?;
                element_types.push(t);
                element_values.push(v);
            }
            Ok(bytes32(keccak256(&raw_encode_types(&element_types, &element_values)?)))
        }

        primitive => Ok((primitive.clone(), AbiValue::from(value))),
    }
}

fn bytes32(hash: [u8; 32]) -> (SolidityType, AbiValue) {
    (SolidityType::FixedBytes(32), AbiValue::from(hash))
}

/// Encode a struct value: its type hash followed by each declared field.
///
/// V3 drops fields that are absent from `data`; V4 keeps every field.
/// Properties of `data` that the type does not declare are ignored.
pub fn encode_data(
    primary_type: &str,
    data: Option<&Value>,
    types: &MessageTypes,
    version: SignTypedDataVersion,
) -> TypedDataResult<Vec<u8>> {
    let mut encoded_types = vec![SolidityType::FixedBytes(32)];
    let mut encoded_values = vec![AbiValue::from(hash_type(primary_type, types)?)];

    let fields = types
        .get(primary_type)
        .ok_or_else(|| TypedDataError::NoTypeDefinition(primary_type.to_string()))?;

    for field in fields {
        let value = match data {
            None | Some(Value::Null) => {
                return Err(TypedDataError::AbsentStructValue {
                    type_name: primary_type.to_string(),
                    field: field.name.clone(),
                })
            }
            Some(Value::Object(map)) => map.get(&field.name),
            // Scalars have no properties
            Some(_) => None,
        };

        if version == SignTypedDataVersion::V3 && value.is_none() {
            continue;
        }

        let (t, v) = encode_field(types, &field.name, &field.type_name, value, version)?;
        encoded_types.push(t);
        encoded_values.push(v);
    }

    raw_encode_types(&encoded_types, &encoded_values)
}

/// hashStruct(s) = keccak256(encodeData(s))
pub fn hash_struct(
    primary_type: &str,
    data: Option<&Value>,
    types: &MessageTypes,
    version: SignTypedDataVersion,
) -> TypedDataResult<[u8; 32]> {
    Ok(keccak256(&encode_data(primary_type, data, types, version)?))
}

#[cfg(test)]
mod encoder_tests {
    use super::*;
    use serde_json::json;
    use SignTypedDataVersion::{V3, V4};

    fn types_from(value: Value) -> MessageTypes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_base_type_name() {
        assert_eq!(base_type_name("Person[]"), "Person");
        assert_eq!(base_type_name("Person[2][]"), "Person");
        assert_eq!(base_type_name("uint256"), "uint256");
        assert_eq!(base_type_name("My_Type"), "My_Type");
    }

    #[test]
    fn test_dependencies_handle_cycles() {
        let types = types_from(json!({
            "Node": [{ "name": "next", "type": "Node" }, { "name": "leaf", "type": "Leaf[]" }],
            "Leaf": [{ "name": "owner", "type": "Node" }]
        }));
        let deps = find_type_dependencies("Node", &types);
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["Leaf", "Node"]);
        assert!(find_type_dependencies("Missing", &types).is_empty());
        assert_eq!(find_type_dependencies("Leaf[]", &types).len(), 2);
    }

    #[test]
    fn test_encode_type_orders_dependencies() {
        let types = types_from(json!({
            "Z": [{ "name": "a", "type": "A" }, { "name": "b", "type": "B" }],
            "B": [{ "name": "x", "type": "uint256" }],
            "A": [{ "name": "y", "type": "B[]" }]
        }));
        assert_eq!(
            encode_type("Z", &types).unwrap(),
            "Z(A a,B b)A(B[] y)B(uint256 x)"
        );
        assert_eq!(
            encode_type("Q", &types),
            Err(TypedDataError::NoTypeDefinition("Q".to_string()))
        );
    }

    #[test]
    fn test_v4_missing_primitive_is_an_error() {
        let types = types_from(json!({ "T": [{ "name": "amount", "type": "uint256" }] }));
        let err = encode_data("T", Some(&json!({})), &types, V4).unwrap_err();
        assert_eq!(err.to_string(), "missing value for field amount of type uint256");

        // V3 omits the field instead
        let encoded = encode_data("T", Some(&json!({})), &types, V3).unwrap();
        assert_eq!(encoded.len(), 32);
    }

    #[test]
    fn test_v3_rejects_arrays() {
        let types = types_from(json!({ "T": [{ "name": "ids", "type": "uint256[]" }] }));
        for ids in [json!([]), json!([1, 2, 3])] {
            assert_eq!(
                encode_data("T", Some(&json!({ "ids": ids })), &types, V3),
                Err(TypedDataError::ArraysUnimplemented)
            );
        }
    }

    #[test]
    fn test_v4_primitive_array_hash() {
        let types = types_from(json!({ "T": [{ "name": "ids", "type": "uint256[]" }] }));
        let encoded = encode_data("T", Some(&json!({ "ids": [1, 2] })), &types, V4).unwrap();

        let mut words = [0u8; 64];
        words[31] = 1;
        words[63] = 2;
        assert_eq!(&encoded[32..], &keccak256(&words));
    }

    #[test]
    fn test_v4_struct_array_hashes_each_element() {
        let types = types_from(json!({
            "Group": [{ "name": "members", "type": "Member[]" }],
            "Member": [{ "name": "id", "type": "uint8" }]
        }));
        let members = json!([{ "id": 1 }, { "id": 2 }]);
        let encoded = encode_data("Group", Some(&json!({ "members": members })), &types, V4).unwrap();

        let mut concatenated = Vec::new();
        for member in members.as_array().unwrap() {
            concatenated.extend(hash_struct("Member", Some(member), &types, V4).unwrap());
        }
        assert_eq!(&encoded[32..], &keccak256(&concatenated));
    }

    #[test]
    fn test_recursive_type_v3_v4_divergence() {
        let types = types_from(json!({
            "Node": [{ "name": "value", "type": "uint256" }, { "name": "child", "type": "Node" }]
        }));
        let leaf = json!({ "value": 7 });

        let v4 = encode_data("Node", Some(&leaf), &types, V4).unwrap();
        assert_eq!(v4.len(), 96);
        assert_eq!(&v4[64..], &[0u8; 32]);

        let v3 = encode_data("Node", Some(&leaf), &types, V3).unwrap();
        assert_eq!(v3.len(), 64);
        assert_ne!(keccak256(&v3), keccak256(&v4));
    }

    #[test]
    fn test_v3_null_nested_struct() {
        let types = types_from(json!({
            "Outer": [{ "name": "inner", "type": "Inner" }],
            "Inner": [{ "name": "x", "type": "uint256" }]
        }));
        let err = encode_data("Outer", Some(&json!({ "inner": null })), &types, V3).unwrap_err();
        assert_eq!(
            err,
            TypedDataError::AbsentStructValue {
                type_name: "Inner".to_string(),
                field: "x".to_string()
            }
        );
        assert!(encode_data("Outer", Some(&json!({ "inner": null })), &types, V4).is_ok());
    }

    #[test]
    fn test_dynamic_leaves_are_hashed() {
        let types = MessageTypes::new();
        let (t, v) = encode_field(&types, "s", "string", Some(&json!("hi")), V4).unwrap();
        assert_eq!(t, SolidityType::FixedBytes(32));
        assert_eq!(v, AbiValue::from(keccak256(b"hi")));

        let (_, v) = encode_field(&types, "s", "string", Some(&Value::Null), V4).unwrap();
        assert_eq!(v, AbiValue::from(keccak256(b"")));

        let (_, v) = encode_field(&types, "b", "bytes", Some(&json!("0x0102")), V4).unwrap();
        assert_eq!(v, AbiValue::from(keccak256(&[1, 2])));

        let (_, v) = encode_field(&types, "b", "bytes", Some(&json!("hi")), V4).unwrap();
        assert_eq!(v, AbiValue::from(keccak256(b"hi")));

        let (_, v) = encode_field(&types, "b", "bytes", Some(&json!(258)), V4).unwrap();
        assert_eq!(v, AbiValue::from(keccak256(&[1, 2])));
    }

    #[test]
    fn test_field_types_are_parsed_once() {
        let types = types_from(json!({ "Person": [{ "name": "name", "type": "string" }] }));

        let (t, v) = encode_field(&types, "n", "uint", Some(&json!(5)), V4).unwrap();
        assert_eq!(t, SolidityType::Uint(256));
        assert_eq!(v, AbiValue::from(json!(5)));

        let person = json!({ "name": "Cow" });
        let (t, v) = encode_field(&types, "p", "Person", Some(&person), V4).unwrap();
        assert_eq!(t, SolidityType::FixedBytes(32));
        assert_eq!(v, AbiValue::from(hash_struct("Person", Some(&person), &types, V4).unwrap()));

        let (_, v) = encode_field(&types, "p", "Person", None, V4).unwrap();
        assert_eq!(v, AbiValue::from([0u8; 32]));

        let (_, nested) = encode_field(&types, "g", "Person[][]", Some(&json!([[person]])), V4).unwrap();
        let inner = hash_struct("Person", Some(&json!({ "name": "Cow" })), &types, V4).unwrap();
        assert_eq!(nested, AbiValue::from(keccak256(&keccak256(&inner))));
    }

    #[test]
    fn test_field_error_precedence() {
        let types = MessageTypes::new();
        assert_eq!(
            encode_field(&types, "f", "float", None, V4).unwrap_err().to_string(),
            "missing value for field f of type float"
        );
        assert_eq!(
            encode_field(&types, "f", "float[]", Some(&json!([1])), V3),
            Err(TypedDataError::ArraysUnimplemented)
        );
        assert_eq!(
            encode_field(&types, "f", "float[]", Some(&json!([1])), V4),
            Err(TypedDataError::UnsupportedType("float".to_string()))
        );
        assert_eq!(
            encode_field(&types, "f", "uint7", Some(&json!(1)), V4),
            Err(TypedDataError::InvalidUintWidth(7))
        );
    }

    #[test]
    fn test_extra_properties_ignored() {
        let types = types_from(json!({ "T": [{ "name": "a", "type": "uint256" }] }));
        let plain = encode_data("T", Some(&json!({ "a": 1 })), &types, V4).unwrap();
        let extra = encode_data("T", Some(&json!({ "a": 1, "b": 2 })), &types, V4).unwrap();
        assert_eq!(plain, extra);
    }
}
