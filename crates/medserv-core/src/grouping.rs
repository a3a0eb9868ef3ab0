//! Report work-item aggregation
//!
//! A report stores one association per (device, work type) pair. The detail
//! and print views want one entry per device instead, listing every work
//! type applied to it.

use std::collections::HashMap;

use medserv_source::decode::decode_collection;
use medserv_source::{EntityId, MedicalDevice, ReportDeviceItem, TypeOfWork};
use serde_json::Value;

use crate::error::CoreResult;
use crate::models::ServicedDeviceGroup;

/// Group report associations by device
///
/// Groups come out in the order their device first appears in
/// `associations`; work types keep association order and are not
/// deduplicated. An association whose device or work type cannot be resolved
/// is skipped as a whole. When a lookup list holds the same id twice, the
/// first record wins.
pub fn group_serviced_devices(
    associations: &[ReportDeviceItem],
    devices: &[MedicalDevice],
    work_types: &[TypeOfWork],
) -> Vec<ServicedDeviceGroup> {
    let device_index = index_by_id(devices, |d| d.id);
    let work_type_index = index_by_id(work_types, |w| w.id);

    let mut groups: Vec<ServicedDeviceGroup> = Vec::new();
    let mut positions: HashMap<EntityId, usize> = HashMap::new();

    for association in associations {
        let Some(device) = device_index.get(&association.medical_device_id) else {
            log::debug!(
                "Skipping association {:?}: unknown medical device {}",
                association.id,
                association.medical_device_id
            );
            continue;
        };
        let Some(work_type) = work_type_index.get(&association.type_of_work_id) else {
            log::debug!(
                "Skipping association {:?}: unknown type of work {}",
                association.id,
                association.type_of_work_id
            );
            continue;
        };

        let position = *positions.entry(device.id).or_insert_with(|| {
            groups.push(ServicedDeviceGroup::new((*device).clone()));
            groups.len() - 1
        });
        groups[position].work_types.push((*work_type).clone());
    }

    groups
}

/// [`group_serviced_devices`] over undecoded API payloads
///
/// Each argument must be an array (optionally wrapped in a `data` envelope);
/// anything else is rejected before any grouping happens.
pub fn group_serviced_devices_json(
    associations: Value,
    devices: Value,
    work_types: Value,
) -> CoreResult<Vec<ServicedDeviceGroup>> {
    let associations: Vec<ReportDeviceItem> = decode_collection(associations, "report_device_item")?;
    let devices: Vec<MedicalDevice> = decode_collection(devices, "medical_devices")?;
    let work_types: Vec<TypeOfWork> = decode_collection(work_types, "types_of_work")?;

    Ok(group_serviced_devices(&associations, &devices, &work_types))
}

/// Total number of work items across all groups
pub fn work_item_count(groups: &[ServicedDeviceGroup]) -> usize {
    groups.iter().map(|g| g.work_types.len()).sum()
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> EntityId) -> HashMap<EntityId, &T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(id(item)).or_insert(item);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use serde_json::json;
    use std::collections::HashSet;

    fn device(id: EntityId, brand: &str) -> MedicalDevice {
        MedicalDevice {
            id,
            brand: brand.to_string(),
            model: format!("M{}", id),
            serial_number: None,
            software_version: None,
            health_facility_id: None,
        }
    }

    fn work(id: EntityId, name: &str) -> TypeOfWork {
        TypeOfWork { id, name: name.to_string() }
    }

    fn item(device_id: EntityId, work_id: EntityId) -> ReportDeviceItem {
        ReportDeviceItem::new(device_id, work_id)
    }

    fn fixtures() -> (Vec<MedicalDevice>, Vec<TypeOfWork>) {
        (
            vec![device(1, "Philips"), device(2, "GE"), device(3, "Mindray")],
            vec![work(10, "Cleaning"), work(11, "Calibration"), work(12, "Repair")],
        )
    }

    #[test]
    fn test_groups_by_device_in_first_seen_order() {
        let (devices, work_types) = fixtures();
        let associations = vec![item(1, 10), item(2, 10), item(1, 11)];

        let groups = group_serviced_devices(&associations, &devices, &work_types);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].device_id(), 1);
        assert_eq!(groups[0].work_type_names(), vec!["Cleaning", "Calibration"]);
        assert_eq!(groups[1].device_id(), 2);
        assert_eq!(groups[1].work_type_names(), vec!["Cleaning"]);
    }

    #[test]
    fn test_unknown_device_is_dropped() {
        let (devices, work_types) = fixtures();
        let associations = vec![item(99, 10), item(1, 10)];

        let groups = group_serviced_devices(&associations, &devices, &work_types);

        assert_eq!(groups.len(), 1);
        assert!(groups.iter().all(|g| g.device_id() != 99));
    }

    #[test]
    fn test_unknown_work_type_does_not_create_empty_group() {
        let (devices, work_types) = fixtures();
        let associations = vec![item(3, 77), item(1, 10), item(3, 12)];

        let groups = group_serviced_devices(&associations, &devices, &work_types);

        // device 3 first appears with a valid work type after device 1
        assert_eq!(groups.iter().map(|g| g.device_id()).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(groups[1].work_type_names(), vec!["Repair"]);
        assert!(groups.iter().all(|g| !g.work_types.is_empty()));
    }

    #[test]
    fn test_duplicate_pairs_are_kept() {
        let (devices, work_types) = fixtures();
        let associations = vec![item(2, 11), item(2, 11), item(2, 10)];

        let groups = group_serviced_devices(&associations, &devices, &work_types);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].work_type_names(), vec!["Calibration", "Calibration", "Cleaning"]);
        assert_eq!(groups[0].work_type_label(", "), "Calibration, Calibration, Cleaning");
        assert_eq!(work_item_count(&groups), 3);
    }

    #[test]
    fn test_device_ids_are_unique() {
        let (devices, work_types) = fixtures();
        let associations = vec![
            item(3, 10), item(1, 11), item(3, 11), item(2, 12), item(1, 10), item(3, 12),
        ];

        let groups = group_serviced_devices(&associations, &devices, &work_types);
        let ids: HashSet<_> = groups.iter().map(|g| g.device_id()).collect();

        assert_eq!(ids.len(), groups.len());
        assert_eq!(groups.iter().map(|g| g.device_id()).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_inputs() {
        let (devices, work_types) = fixtures();
        assert!(group_serviced_devices(&[], &devices, &work_types).is_empty());
        assert!(group_serviced_devices(&[item(1, 10)], &[], &work_types).is_empty());
        assert!(group_serviced_devices(&[item(1, 10)], &devices, &[]).is_empty());
    }

    #[test]
    fn test_first_lookup_record_wins() {
        let devices = vec![device(1, "First"), device(1, "Second")];
        let work_types = vec![work(10, "Cleaning"), work(10, "Shadowed")];

        let groups = group_serviced_devices(&[item(1, 10)], &devices, &work_types);

        assert_eq!(groups[0].device.brand, "First");
        assert_eq!(groups[0].work_type_names(), vec!["Cleaning"]);
    }

    #[test]
    fn test_idempotent_and_inputs_untouched() {
        let (devices, work_types) = fixtures();
        let associations = vec![item(1, 10), item(99, 10), item(2, 12), item(1, 12)];
        let before = (associations.clone(), devices.clone(), work_types.clone());

        let first = group_serviced_devices(&associations, &devices, &work_types);
        let second = group_serviced_devices(&associations, &devices, &work_types);

        assert_eq!(first, second);
        assert_eq!((associations, devices, work_types), before);
    }

    #[test]
    fn test_json_entry_point() {
        let groups = group_serviced_devices_json(
            json!([{"id": 1, "medical_device_id": 1, "type_of_work_id": 10}]),
            json!({"data": [{"id": 1, "brand": "Philips", "model": "MP50"}]}),
            json!([{"id": "10", "name": "Cleaning"}]),
        )
        .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].device.model, "MP50");
    }

    #[test]
    fn test_json_entry_point_rejects_non_arrays() {
        let err = group_serviced_devices_json(json!([]), json!({"id": 1}), json!([])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));

        let err = group_serviced_devices_json(json!(null), json!([]), json!([])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }
}
