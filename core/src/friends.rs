use api_types::{FriendRequest, User};
use tracing::info;

use crate::api::users;
use crate::cache::{QueryCache, QueryKey};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

/// How the caller relates to another user. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipState {
    Friend,
    RequestSent,
    RequestReceived,
    None,
}

/// Classify `target` against independently fetched snapshots. Friendship
/// wins over a dangling request, and a sent request wins over a received one.
pub fn resolve<'a, I>(
    friend_ids: I,
    sent: &[FriendRequest],
    received: &[FriendRequest],
    target: &str,
) -> RelationshipState
where
    I: IntoIterator<Item = &'a str>,
{
    if friend_ids.into_iter().any(|id| id == target) {
        RelationshipState::Friend
    } else if sent.iter().any(|r| r.receiver_id == target) {
        RelationshipState::RequestSent
    } else if received.iter().any(|r| r.sender_id == target) {
        RelationshipState::RequestReceived
    } else {
        RelationshipState::None
    }
}

/// What a profile screen may offer for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Add,
    Remove,
    Cancel,
    Accept,
    Reject,
}

pub fn available_actions(state: RelationshipState) -> &'static [FriendAction] {
    match state {
        RelationshipState::Friend => &[FriendAction::Remove],
        RelationshipState::RequestSent => &[FriendAction::Cancel],
        RelationshipState::RequestReceived => &[FriendAction::Accept, FriendAction::Reject],
        RelationshipState::None => &[FriendAction::Add],
    }
}

/// The three lists the resolver works from, as last fetched.
#[derive(Debug, Clone, Default)]
pub struct FriendRequestLists {
    pub friends: Vec<User>,
    pub sent: Vec<FriendRequest>,
    pub received: Vec<FriendRequest>,
}

impl FriendRequestLists {
    pub fn state_of(&self, target: &str) -> RelationshipState {
        resolve(
            self.friends.iter().map(|u| u.id.as_str()),
            &self.sent,
            &self.received,
            target,
        )
    }

    pub fn find_sent_to(&self, target: &str) -> Result<&FriendRequest> {
        find_sent_to(&self.sent, target)
    }

    pub fn find_received_from(&self, target: &str) -> Result<&FriendRequest> {
        find_received_from(&self.received, target)
    }
}

/// Friend operations over the API with cache invalidation on success.
pub struct FriendService<'a> {
    api: &'a ApiClient,
    cache: &'a QueryCache,
}

impl<'a> FriendService<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn friends(&self) -> Result<Vec<User>> {
        self.cache
            .fetch(QueryKey::Friends, || users::friends(self.api))
            .await
    }

    pub async fn sent(&self) -> Result<Vec<FriendRequest>> {
        self.cache
            .fetch(QueryKey::SentRequests, || users::sent_requests(self.api))
            .await
    }

    pub async fn received(&self) -> Result<Vec<FriendRequest>> {
        self.cache
            .fetch(QueryKey::ReceivedRequests, || {
                users::received_requests(self.api)
            })
            .await
    }

    /// Fetch (or reuse) all three lists. They are separate snapshots, so a
    /// concurrent change on the server may show up only after a refetch.
    pub async fn lists(&self) -> Result<FriendRequestLists> {
        let (friends, sent, received) =
            tokio::try_join!(self.friends(), self.sent(), self.received())?;
        Ok(FriendRequestLists {
            friends,
            sent,
            received,
        })
    }

    pub async fn relationship(&self, target: &str) -> Result<RelationshipState> {
        Ok(self.lists().await?.state_of(target))
    }

    pub async fn send(&self, target: &str) -> Result<()> {
        users::send_request(self.api, target).await?;
        info!(%target, "friend request sent");
        self.cache.invalidate(&[
            QueryKey::User(target.into()),
            QueryKey::Friends,
            QueryKey::SentRequests,
            QueryKey::ReceivedRequests,
            QueryKey::Profile,
        ]);
        Ok(())
    }

    /// Accept the pending request `target` sent to the caller.
    pub async fn accept_from(&self, target: &str) -> Result<()> {
        let received = self.received().await?;
        let request = find_received_from(&received, target)?;
        self.accept_request(request).await
    }

    /// Accept by request id, as offered in the notifications list.
    pub async fn accept(&self, request_id: &str) -> Result<()> {
        let received = self.received().await?;
        let request = find_by_id(&received, request_id)?;
        self.accept_request(request).await
    }

    async fn accept_request(&self, request: &FriendRequest) -> Result<()> {
        users::accept_request(self.api, &request.id).await?;
        info!(request_id = %request.id, "friend request accepted");
        self.cache.invalidate(&[
            QueryKey::User(request.sender_id.clone()),
            QueryKey::Friends,
            QueryKey::ReceivedRequests,
            QueryKey::SentRequests,
            QueryKey::Profile,
        ]);
        Ok(())
    }

    pub async fn reject_from(&self, target: &str) -> Result<()> {
        let received = self.received().await?;
        let request = find_received_from(&received, target)?;
        users::decline_request(self.api, &request.id).await?;
        info!(request_id = %request.id, "friend request rejected");
        self.cache.invalidate(&[
            QueryKey::User(target.into()),
            QueryKey::ReceivedRequests,
        ]);
        Ok(())
    }

    /// Withdraw the caller's pending request to `target`.
    pub async fn cancel_to(&self, target: &str) -> Result<()> {
        let sent = self.sent().await?;
        let request = find_sent_to(&sent, target)?;
        self.cancel_request(request).await
    }

    pub async fn cancel(&self, request_id: &str) -> Result<()> {
        let sent = self.sent().await?;
        let request = find_by_id(&sent, request_id)?;
        self.cancel_request(request).await
    }

    async fn cancel_request(&self, request: &FriendRequest) -> Result<()> {
        users::cancel_request(self.api, &request.id).await?;
        info!(request_id = %request.id, "friend request cancelled");
        self.cache.invalidate(&[
            QueryKey::User(request.receiver_id.clone()),
            QueryKey::SentRequests,
            QueryKey::ReceivedRequests,
        ]);
        Ok(())
    }

    pub async fn remove(&self, friend_id: &str) -> Result<()> {
        users::remove_friend(self.api, friend_id).await?;
        info!(%friend_id, "friend removed");
        self.cache.invalidate(&[
            QueryKey::User(friend_id.into()),
            QueryKey::Friends,
            QueryKey::Profile,
        ]);
        Ok(())
    }
}

pub fn find_sent_to<'r>(sent: &'r [FriendRequest], target: &str) -> Result<&'r FriendRequest> {
    sent.iter()
        .find(|r| r.receiver_id == target)
        .ok_or_else(|| ClientError::NotFound(format!("friend request to {target}")))
}

pub fn find_received_from<'r>(
    received: &'r [FriendRequest],
    target: &str,
) -> Result<&'r FriendRequest> {
    received
        .iter()
        .find(|r| r.sender_id == target)
        .ok_or_else(|| ClientError::NotFound(format!("friend request from {target}")))
}

fn find_by_id<'r>(list: &'r [FriendRequest], request_id: &str) -> Result<&'r FriendRequest> {
    list.iter()
        .find(|r| r.id == request_id)
        .ok_or_else(|| ClientError::NotFound(format!("friend request {request_id}")))
}
