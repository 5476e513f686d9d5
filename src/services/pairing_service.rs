// ==================== PAIRING ====================
// Conexão entre dois usuários via código de convite e resolução do parceiro

use serde::{Deserialize, Serialize};

use crate::{
    context::AppContext,
    database::StoreError,
    models::{Pairing, User},
    utils::error::AppError,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub my_id: Option<String>,
    pub partner_code: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub partner_id: String,
    pub partner_name: Option<String>,
}

pub async fn find_pairing(ctx: &AppContext, user_id: &str) -> Result<Option<Pairing>, AppError> {
    Ok(ctx.pairings.find_for_user(user_id).await?)
}

pub async fn resolve_partner_id(ctx: &AppContext, user_id: &str) -> Result<Option<String>, AppError> {
    Ok(find_pairing(ctx, user_id)
        .await?
        .map(|p| p.other_side(user_id).to_string()))
}

/// Pairing plus the partner's user row. `None` when unpaired or when the
/// partner row no longer exists.
pub async fn resolve_partner(
    ctx: &AppContext,
    user_id: &str,
) -> Result<Option<(Pairing, User)>, AppError> {
    let Some(pairing) = find_pairing(ctx, user_id).await? else {
        return Ok(None);
    };

    let partner = ctx.users.find_by_id(pairing.other_side(user_id)).await?;
    Ok(partner.map(|p| (pairing, p)))
}

/// Pareia `my_id` com o dono de `partner_code`. Idempotente nas duas direções.
pub async fn connect(
    ctx: &AppContext,
    my_id: &str,
    partner_code: &str,
) -> Result<ConnectResponse, AppError> {
    ctx.users
        .find_by_id(my_id)
        .await?
        .ok_or_else(|| AppError::not_found("Your account not found"))?;

    let partner = ctx
        .users
        .find_by_code(partner_code)
        .await?
        .ok_or_else(|| AppError::not_found("Partner code not found"))?;

    if partner.user_id == my_id {
        return Err(AppError::validation("You cannot connect to yourself 💔"));
    }

    let already_connected = ConnectResponse {
        success: true,
        message: Some("Already connected".to_string()),
        partner_id: partner.user_id.clone(),
        partner_name: partner.name.clone(),
    };

    if ctx.pairings.find_between(my_id, &partner.user_id).await?.is_some() {
        return Ok(already_connected);
    }

    // Status vai direto para `active`: não existe fluxo de aceite
    let pairing = Pairing::new_active(my_id, &partner.user_id);

    match ctx.pairings.insert(&pairing).await {
        Ok(()) => {}
        // Concurrent connect won the race on the unique pair key
        Err(StoreError::Duplicate(_)) => {
            log::info!("ℹ️  Pairing {} created concurrently", pairing.pair_key);
            return Ok(already_connected);
        }
        Err(e) => return Err(e.into()),
    }

    log::info!("💞 Users connected: {} <-> {}", my_id, partner.user_id);

    Ok(ConnectResponse {
        success: true,
        message: None,
        partner_id: partner.user_id,
        partner_name: partner.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PairingStatus;
    use crate::testing::TestContext;
    use crate::database::memory::RacingPairings;
    use crate::database::PairingStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_connect_creates_active_pairing() {
        let t = TestContext::new();
        let (ana, _, _) = t.user("Ana").await;
        let (bia, bia_code, _) = t.user("Bia").await;

        let response = connect(&t.ctx, &ana, &bia_code).await.unwrap();

        assert_eq!(response.partner_id, bia);
        assert_eq!(response.partner_name.as_deref(), Some("Bia"));
        assert!(response.message.is_none());

        let pairing = find_pairing(&t.ctx, &ana).await.unwrap().unwrap();
        assert_eq!(pairing.status, PairingStatus::Active);
    }

    #[tokio::test]
    async fn test_connect_is_idempotent_in_both_directions() {
        let t = TestContext::new();
        let (ana, ana_code, _) = t.user("Ana").await;
        let (bia, bia_code, _) = t.user("Bia").await;

        connect(&t.ctx, &ana, &bia_code).await.unwrap();
        let again = connect(&t.ctx, &ana, &bia_code).await.unwrap();
        let reversed = connect(&t.ctx, &bia, &ana_code).await.unwrap();

        assert_eq!(again.message.as_deref(), Some("Already connected"));
        assert_eq!(again.partner_id, bia);
        assert_eq!(reversed.message.as_deref(), Some("Already connected"));
        assert_eq!(reversed.partner_id, ana);
        assert_eq!(t.store.pairing_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_to_self_fails() {
        let t = TestContext::new();
        let (ana, ana_code, _) = t.user("Ana").await;

        let err = connect(&t.ctx, &ana, &ana_code).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(t.store.pairing_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_unknown_ids() {
        let t = TestContext::new();
        let (ana, _, _) = t.user("Ana").await;
        let (_, bia_code, _) = t.user("Bia").await;

        let unknown_me = connect(&t.ctx, "ghost", &bia_code).await.unwrap_err();
        let unknown_code = connect(&t.ctx, &ana, "LOVII-000000").await.unwrap_err();

        assert!(matches!(unknown_me, AppError::NotFound(_)));
        assert!(matches!(unknown_code, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_partner_from_either_side() {
        let t = TestContext::new();
        let (ana, _, _) = t.user("Ana").await;
        let (bia, bia_code, _) = t.user("Bia").await;
        let (cris, _, _) = t.user("Cris").await;

        connect(&t.ctx, &ana, &bia_code).await.unwrap();

        assert_eq!(resolve_partner_id(&t.ctx, &ana).await.unwrap(), Some(bia.clone()));
        assert_eq!(resolve_partner_id(&t.ctx, &bia).await.unwrap(), Some(ana));
        assert_eq!(resolve_partner_id(&t.ctx, &cris).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_losing_insert_race_reports_already_connected() {
        let mut t = TestContext::new();
        let (ana, _, _) = t.user("Ana").await;
        let (bia, bia_code, _) = t.user("Bia").await;
        connect(&t.ctx, &ana, &bia_code).await.unwrap();

        // O pre-check não vê o par; só o índice único pega a duplicata
        t.ctx.pairings = Arc::new(RacingPairings { inner: t.store.clone() }) as Arc<dyn PairingStore>;
        let again = connect(&t.ctx, &ana, &bia_code).await.unwrap();

        assert_eq!(again.message.as_deref(), Some("Already connected"));
        assert_eq!(again.partner_id, bia);
        assert_eq!(t.store.pairing_count(), 1);
    }
}
