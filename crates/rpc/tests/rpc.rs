mod common;

use common::{
    build_http_client, build_ws_client, test_address, DummyEthApiClient, DummyEthApiServer,
    DummyEthApiServerImpl,
};
use ethers::types::U64;
use silius_rpc::JsonRpcServer;
use tokio;

// jsonrpsee's server multiplexes http and ws over the one listen address, so a single
// JsonRpcServer accepts both kinds of client at once.
#[tokio::test]
async fn rpc_server_serves_http_and_ws_on_one_address() {
    let address = test_address();
    let mut server = JsonRpcServer::new(address.clone());

    let chain_id: U64 = U64::from(0x7a69);
    server.add_method(DummyEthApiServerImpl { chain_id }.into_rpc()).unwrap();

    let handle = server.start().await.unwrap();
    tokio::spawn(handle.stopped());

    let http_client = build_http_client(address.clone()).unwrap();
    let http_response = DummyEthApiClient::chain_id(&http_client).await.unwrap();
    assert_eq!(http_response, chain_id);

    let ws_client = build_ws_client(address.clone()).await.unwrap();
    let ws_response = DummyEthApiClient::chain_id(&ws_client).await.unwrap();
    assert_eq!(ws_response, chain_id);
}

#[tokio::test]
async fn rpc_server_rejects_unregistered_method() {
    let address = test_address();
    let server = JsonRpcServer::new(address.clone());
    let handle = server.start().await.unwrap();
    tokio::spawn(handle.stopped());

    let http_client = build_http_client(address).unwrap();
    assert!(DummyEthApiClient::chain_id(&http_client).await.is_err());
}
