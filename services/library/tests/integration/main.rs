mod helpers;

mod http_test;
mod storage_contract_test;
