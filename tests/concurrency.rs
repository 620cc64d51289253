use std::sync::Arc;
use std::thread;

use delivery_registry::error::AppError;
use delivery_registry::models::request::{GeoPoint, Priority, RequestStatus};
use delivery_registry::registry::NewRequest;
use delivery_registry::state::AppState;

#[test]
fn concurrent_claims_have_exactly_one_winner() {
    let state = Arc::new(AppState::new(1024));
    let request = state
        .registry
        .create(NewRequest {
            item: "お米 5kg".to_string(),
            requester_name: "田中一郎".to_string(),
            location: GeoPoint {
                latitude: 35.6581,
                longitude: 139.7414,
            },
            priority: Priority::Medium,
            phone: Some("090-5555-6666".to_string()),
        })
        .unwrap();

    let id = request.id;
    let handles: Vec<_> = (0..16)
        .map(|n| {
            let state = state.clone();
            thread::spawn(move || state.registry.claim(id, &format!("delivery_{n}")))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| matches!(
        r,
        Err(AppError::InvalidTransition {
            from: RequestStatus::Delivering,
            ..
        })
    )));

    let stored = state.registry.get(request.id).unwrap();
    assert_eq!(stored.status, RequestStatus::Delivering);
    assert_eq!(stored.delivery_person_id, winners[0].delivery_person_id);
}

#[test]
fn concurrent_claim_next_never_hands_out_a_request_twice() {
    let state = Arc::new(AppState::new(1024));
    for n in 0..8 {
        state
            .registry
            .create(NewRequest {
                item: format!("パン {n}個"),
                requester_name: "山田次郎".to_string(),
                location: GeoPoint {
                    latitude: 35.6762,
                    longitude: 139.6503,
                },
                priority: if n % 2 == 0 { Priority::High } else { Priority::Low },
                phone: None,
            })
            .unwrap();
    }

    let handles: Vec<_> = (0..12)
        .map(|n| {
            let state = state.clone();
            thread::spawn(move || state.registry.claim_next(&format!("delivery_{n}")))
        })
        .collect();

    let mut claimed = Vec::new();
    let mut empty = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(request) => claimed.push(request.id),
            Err(AppError::NoWaitingRequests) => empty += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    claimed.sort();
    claimed.dedup();
    assert_eq!(claimed.len(), 8);
    assert_eq!(empty, 4);
    assert!(state
        .registry
        .list_by_status(RequestStatus::Waiting)
        .unwrap()
        .is_empty());
}
