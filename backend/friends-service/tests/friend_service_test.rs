mod common;

use common::InMemoryFriends;
use friends_service::domain::FriendshipStatus;
use friends_service::error::ServiceError;
use uuid::Uuid;

#[tokio::test]
async fn accepted_request_makes_both_users_friends() {
    let store = InMemoryFriends::new();
    let service = store.service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    assert_eq!(request.status, "pending");
    assert_eq!(request.sender_id, alice);

    let accepted = service
        .accept_friend_request(request.id, bob)
        .await
        .unwrap();
    assert_eq!(accepted.status, "accepted");
    assert_eq!(store.friendship_rows(alice, bob), 2);

    assert_eq!(
        service.check_friendship(alice, bob).await.unwrap(),
        FriendshipStatus::Friends
    );
    assert_eq!(
        service.check_friendship(bob, alice).await.unwrap(),
        FriendshipStatus::Friends
    );

    let alice_friends = service.get_friends(alice, 1, 20).await.unwrap();
    assert_eq!(alice_friends.total_count, 1);
    assert_eq!(alice_friends.items[0].friend_id, bob);
    let bob_friends = service.get_friends(bob, 1, 20).await.unwrap();
    assert_eq!(bob_friends.items[0].friend_id, alice);
}

#[tokio::test]
async fn removing_a_friend_resets_the_pair() {
    let store = InMemoryFriends::new();
    let service = store.service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    assert!(matches!(
        service.check_friendship(alice, bob).await.unwrap(),
        FriendshipStatus::Pending { request_id } if request_id == request.id
    ));
    service.accept_friend_request(request.id, bob).await.unwrap();
    service.remove_friend(alice, bob).await.unwrap();

    let status = service.check_friendship(alice, bob).await.unwrap();
    assert_eq!(status, FriendshipStatus::Unrelated);
    assert_eq!(status.as_str(), "none");
    assert_eq!(store.friendship_rows(alice, bob), 0);

    // the accepted request no longer blocks a fresh one
    let again = service.send_friend_request(alice, bob).await.unwrap();
    assert_eq!(again.status, "pending");
    assert_ne!(again.id, request.id);
}

#[tokio::test]
async fn remove_friend_requires_friendship() {
    let service = InMemoryFriends::new().service();

    let err = service
        .remove_friend(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn rejected_request_is_terminal_for_the_sender() {
    let store = InMemoryFriends::new();
    let service = store.service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    let rejected = service
        .reject_friend_request(request.id, bob)
        .await
        .unwrap();
    assert_eq!(rejected.status, "rejected");
    assert_eq!(store.friendship_rows(alice, bob), 0);
    assert_eq!(
        service.check_friendship(alice, bob).await.unwrap(),
        FriendshipStatus::Unrelated
    );

    let err = service.send_friend_request(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));

    // the other direction is a different slot
    let reverse = service.send_friend_request(bob, alice).await.unwrap();
    assert_eq!(reverse.sender_id, bob);
}

#[tokio::test]
async fn settled_requests_cannot_be_settled_again() {
    let service = InMemoryFriends::new().service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    service.accept_friend_request(request.id, bob).await.unwrap();

    let err = service
        .accept_friend_request(request.id, bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));
    let err = service
        .reject_friend_request(request.id, bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));
}

#[tokio::test]
async fn only_the_receiver_settles_a_request() {
    let service = InMemoryFriends::new().service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();

    let err = service
        .accept_friend_request(request.id, alice)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(msg) if msg.contains("accept")));

    let err = service
        .reject_friend_request(request.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(msg) if msg.contains("reject")));

    let err = service
        .accept_friend_request(Uuid::new_v4(), bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn send_request_rejects_duplicates_and_self() {
    let service = InMemoryFriends::new().service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let err = service.send_friend_request(alice, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    service.send_friend_request(alice, bob).await.unwrap();
    let err = service.send_friend_request(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));

    // pending in the other direction counts too
    let err = service.send_friend_request(bob, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));
}

#[tokio::test]
async fn send_request_to_friend_is_rejected() {
    let service = InMemoryFriends::new().service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    service.accept_friend_request(request.id, bob).await.unwrap();

    let err = service.send_friend_request(bob, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(msg) if msg == "already friends"));
}

#[tokio::test]
async fn friend_requests_filter_by_status() {
    let service = InMemoryFriends::new().service();
    let receiver = Uuid::new_v4();
    let (first, second, third) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let r1 = service.send_friend_request(first, receiver).await.unwrap();
    service.send_friend_request(second, receiver).await.unwrap();
    let r3 = service.send_friend_request(third, receiver).await.unwrap();
    service.reject_friend_request(r1.id, receiver).await.unwrap();

    let all = service
        .get_friend_requests(receiver, "", 1, 20)
        .await
        .unwrap();
    assert_eq!(all.total_count, 3);
    assert_eq!(all.items[0].id, r3.id);

    let pending = service
        .get_friend_requests(receiver, "pending", 1, 20)
        .await
        .unwrap();
    assert_eq!(pending.total_count, 2);
    assert!(pending.items.iter().all(|r| r.is_pending()));

    let rejected = service
        .get_friend_requests(receiver, "rejected", 1, 20)
        .await
        .unwrap();
    assert_eq!(rejected.total_count, 1);
    assert_eq!(rejected.items[0].sender_id, first);

    let err = service
        .get_friend_requests(receiver, "maybe", 1, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn friend_requests_are_paginated() {
    let service = InMemoryFriends::new().service();
    let receiver = Uuid::new_v4();
    for _ in 0..5 {
        service
            .send_friend_request(Uuid::new_v4(), receiver)
            .await
            .unwrap();
    }

    let page = service
        .get_friend_requests(receiver, "pending", 2, 2)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, 5);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn blocking_ends_friendship() {
    let store = InMemoryFriends::new();
    let service = store.service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let request = service.send_friend_request(alice, bob).await.unwrap();
    service.accept_friend_request(request.id, bob).await.unwrap();

    service.block_user(bob, alice).await.unwrap();
    assert_eq!(store.friendship_rows(alice, bob), 0);

    // blocked shows from both sides
    assert_eq!(
        service.check_friendship(alice, bob).await.unwrap(),
        FriendshipStatus::Blocked
    );
    assert_eq!(
        service.check_friendship(bob, alice).await.unwrap(),
        FriendshipStatus::Blocked
    );

    let err = service.send_friend_request(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let blocked = service.get_blocked_users(bob, 1, 20).await.unwrap();
    assert_eq!(blocked.total_count, 1);
    assert_eq!(blocked.items[0].blocked_user_id, alice);
}

#[tokio::test]
async fn block_and_unblock_report_their_state() {
    let service = InMemoryFriends::new().service();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let err = service.block_user(alice, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    service.block_user(alice, bob).await.unwrap();
    let err = service.block_user(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));

    service.unblock_user(alice, bob).await.unwrap();
    let err = service.unblock_user(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert_eq!(
        service.check_friendship(alice, bob).await.unwrap(),
        FriendshipStatus::Unrelated
    );
    assert_eq!(service.get_blocked_users(alice, 1, 20).await.unwrap().total_count, 0);
}

#[tokio::test]
async fn check_friendship_with_yourself() {
    let service = InMemoryFriends::new().service();
    let alice = Uuid::new_v4();

    let status = service.check_friendship(alice, alice).await.unwrap();
    assert_eq!(status, FriendshipStatus::Myself);
    assert_eq!(status.as_str(), "self");
}

#[tokio::test]
async fn storage_failures_surface_as_internal() {
    let store = InMemoryFriends::new();
    let service = store.service();
    store.fail_reads(true);

    let err = service
        .check_friendship(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Internal(_)));
}
