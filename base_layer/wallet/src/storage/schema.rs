// Copyright 2026. The Nyx Wallet Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

diesel::table! {
    parameter_values (tx_id, sub_tx_id, parameter_id) {
        tx_id -> Binary,
        sub_tx_id -> BigInt,
        parameter_id -> Text,
        value -> Binary,
    }
}

diesel::table! {
    coins (id) {
        id -> BigInt,
        commitment -> Binary,
        value -> BigInt,
        asset_id -> BigInt,
        maturity -> BigInt,
        status -> Text,
        reserved_for -> Nullable<Binary>,
        created_at -> Text,
    }
}

diesel::table! {
    addresses (wallet_id) {
        wallet_id -> Binary,
        is_owned -> Bool,
        created_at -> Text,
        expires_at -> Nullable<Text>,
        label -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(parameter_values, coins, addresses);
