//! Batch work-planner tests
//!
//! A plan's units, executed independently, must read exactly the rows a
//! single merged scan of the same range would emit: no duplicates, no
//! omissions, and safe to run on separate threads.

use std::sync::Arc;
use std::thread;

use keyspread::batch::WorkPlanner;
use keyspread::distributor::{HashPrefixDistributor, KeyDistributor};
use keyspread::scan::{MergeScanner, ScanRange};
use keyspread::store::MemoryStore;

const KEY_PREFIX: u64 = 1_700_000_000_000;

fn populate(store: &MemoryStore, distributor: &dyn KeyDistributor, count: i64) {
    for i in 0..count {
        let value = count + i - i * (i % 2) * 2;
        let original = (KEY_PREFIX + value as u64).to_be_bytes();
        let physical = distributor.encode(&original).unwrap();
        store.put(physical, (value as u64).to_be_bytes().to_vec()).unwrap();
    }
}

#[test]
fn split_and_merge_read_the_same_rows() {
    let store = MemoryStore::new();
    let distributor: Arc<dyn KeyDistributor> =
        Arc::new(HashPrefixDistributor::new(16).unwrap());
    populate(&store, distributor.as_ref(), 500);

    // Single merged scan over everything.
    let mut merged_keys = Vec::new();
    let mut scanner =
        MergeScanner::open(&store, Arc::clone(&distributor), &ScanRange::all()).unwrap();
    while let Some(row) = scanner.next_row().unwrap() {
        merged_keys.push(row.key);
    }

    // Independently executed work units over the same range.
    let planner = WorkPlanner::new(distributor);
    let mut unit_keys = Vec::new();
    for unit in planner.plan(&ScanRange::all()) {
        let mut reader = unit.open(&store).unwrap();
        while let Some(row) = reader.next_row().unwrap() {
            unit_keys.push(row.key);
        }
    }

    assert_eq!(unit_keys.len(), merged_keys.len());
    unit_keys.sort_unstable();
    // merged_keys is already in ascending original order.
    assert_eq!(unit_keys, merged_keys);
}

#[test]
fn units_run_on_independent_workers() {
    let store = MemoryStore::new();
    let distributor: Arc<dyn KeyDistributor> =
        Arc::new(HashPrefixDistributor::new(8).unwrap());
    populate(&store, distributor.as_ref(), 500);

    let planner = WorkPlanner::new(distributor);
    let units = planner.plan(&ScanRange::all());

    let store_ref = &store;
    let total: u64 = thread::scope(|scope| {
        let handles: Vec<_> = units
            .iter()
            .map(|unit| scope.spawn(move || unit.count_rows(store_ref).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(total, 500);
}

#[test]
fn bounded_plan_matches_bounded_merge() {
    let store = MemoryStore::new();
    let distributor: Arc<dyn KeyDistributor> =
        Arc::new(HashPrefixDistributor::new(16).unwrap());
    populate(&store, distributor.as_ref(), 500);

    let range = ScanRange::bounded(
        (KEY_PREFIX + 100).to_be_bytes().to_vec(),
        (KEY_PREFIX + 900).to_be_bytes().to_vec(),
    );

    let mut merged_count = 0u64;
    let mut scanner =
        MergeScanner::open(&store, Arc::clone(&distributor), &range).unwrap();
    while scanner.next_row().unwrap().is_some() {
        merged_count += 1;
    }

    let planner = WorkPlanner::new(distributor);
    let unit_count: u64 = planner
        .plan(&range)
        .iter()
        .map(|unit| unit.count_rows(&store).unwrap())
        .sum();

    assert_eq!(unit_count, merged_count);
}

#[test]
fn row_counter_skips_logically_deleted_rows() {
    let store = MemoryStore::new();
    let distributor: Arc<dyn KeyDistributor> =
        Arc::new(HashPrefixDistributor::new(8).unwrap());
    populate(&store, distributor.as_ref(), 100);

    // Blank out every tenth row's value.
    for i in (0u64..100).step_by(10) {
        let original = (KEY_PREFIX + 100 + i).to_be_bytes();
        let physical = distributor.encode(&original).unwrap();
        if store.get(&physical).unwrap().is_some() {
            store.put(physical, Vec::new()).unwrap();
        }
    }

    let planner = WorkPlanner::new(Arc::clone(&distributor));
    let counted: u64 = planner
        .plan(&ScanRange::all())
        .iter()
        .map(|unit| unit.count_rows(&store).unwrap())
        .sum();

    // Count rows with non-empty values directly through a merged scan.
    let mut expected = 0u64;
    let mut scanner = MergeScanner::open(&store, distributor, &ScanRange::all()).unwrap();
    while let Some(row) = scanner.next_row().unwrap() {
        if !row.is_empty_value() {
            expected += 1;
        }
    }

    assert_eq!(counted, expected);
    assert!(counted < 100);
}

#[test]
fn plan_metadata_rebuilds_equivalent_distributor() {
    // What a remote batch reader does: receive params, rebuild, decode.
    let store = MemoryStore::new();
    let distributor: Arc<dyn KeyDistributor> =
        Arc::new(HashPrefixDistributor::new(8).unwrap());
    populate(&store, distributor.as_ref(), 50);

    let planner = WorkPlanner::new(distributor);
    for unit in planner.plan(&ScanRange::all()) {
        let json = unit.distributor_params().to_json().unwrap();
        let remote = keyspread::distributor::DistributorConfig::from_json(&json)
            .unwrap()
            .build()
            .unwrap();

        let mut reader = unit.open(&store).unwrap();
        while let Some(row) = reader.next_row().unwrap() {
            // The decoded key round-trips under the rebuilt distributor.
            let physical = remote.encode(&row.key).unwrap();
            assert_eq!(remote.decode(&physical).unwrap(), row.key);
        }
    }
}
