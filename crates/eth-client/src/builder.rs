use chain_eth::{ChainContext, KeyIdentity, TransactionAuthorization};
use tracing::{debug, info};

use crate::context::OperationContext;
use crate::error::ClientError;
use crate::gas::{GasOracleClient, QuoteValidator};
use crate::rpc::{BlockTag, NonceSource};

/// Assembles a [`TransactionAuthorization`] for `identity`.
///
/// The nonce lookup and the gas quote run one after the other; a cancelled
/// `ctx` is checked before each so no oracle request is issued once
/// cancellation has been observed. Any failure aborts the whole call.
pub async fn prepare(
    ctx: &OperationContext,
    identity: &KeyIdentity,
    chain: ChainContext,
    nonces: &dyn NonceSource,
    gas_oracle: &GasOracleClient,
    gas_limit: u64,
    validator: &dyn QuoteValidator,
) -> Result<TransactionAuthorization, ClientError> {
    if ctx.is_cancelled() {
        return Err(ClientError::Cancelled);
    }

    let sender = identity.address();
    let nonce = nonces.nonce_at(ctx, sender, BlockTag::Latest).await?;
    debug!(%sender, nonce, "nonce fetched");

    if ctx.is_cancelled() {
        return Err(ClientError::Cancelled);
    }

    let quote = gas_oracle.fetch_quote(ctx).await?;
    validator
        .validate(&quote)
        .map_err(ClientError::QuoteRejected)?;

    let authorization =
        TransactionAuthorization::from_quote(nonce, &quote, gas_limit, chain, sender);

    info!(
        %sender,
        chain_id = authorization.chain_id,
        nonce = authorization.nonce,
        gas_fee_cap = %authorization.gas_fee_cap,
        gas_tip_cap = %authorization.gas_tip_cap,
        gas_limit = authorization.gas_limit,
        "transaction authorization prepared"
    );

    Ok(authorization)
}
