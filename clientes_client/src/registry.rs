use std::fmt::Display;

use clientes::domain::customer::{Customer, CustomerId, CustomerInput};
use tracing::{debug, warn};

use crate::api::{ApiClient, ClientError};

/// Message shown to the user when something goes wrong
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: &'static str,
}

impl Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

const ERROR: &str = "Erro";

pub const FIELDS_REQUIRED: Alert = Alert {
    title: "Atenção",
    message: "Todos os campos são obrigatórios",
};

pub const EDIT_FIELDS_REQUIRED: Alert = Alert {
    title: "Atenção",
    message: "Preencha todos os campos necessários",
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Rejected requests and unreachable servers get different texts; nothing finer.
    pub fn alert(self, error: &ClientError) -> Alert {
        let rejected = matches!(error, ClientError::Status { .. });
        let message = match (self, rejected) {
            (Operation::Load, true) => "Falha ao carregar dados dos clientes",
            (Operation::Load, false) => "Servidor indisponível",
            (Operation::Create, true) => "Falha no cadastro do cliente",
            (Operation::Create, false) => "Problema de conexão com o servidor",
            (Operation::Update, true) => "Falha na atualização dos dados",
            (Operation::Update, false) => "Servidor indisponível",
            (Operation::Delete, true) => "Falha na exclusão do cliente",
            (Operation::Delete, false) => "Problema de conexão",
        };
        Alert {
            title: ERROR,
            message,
        }
    }
}

/// Free-text form fields as typed by the user
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub age: String,
    pub state: String,
}

impl CustomerForm {
    pub fn to_input(&self) -> Result<CustomerInput, Alert> {
        let age = self
            .age
            .trim()
            .parse::<i64>()
            .map_err(|_| FIELDS_REQUIRED)?;
        CustomerInput::new(
            self.name.trim().to_owned(),
            age,
            self.state.trim().to_owned(),
        )
        .map_err(|_| FIELDS_REQUIRED)
    }
}

/// Local copy of the customer list, updated in place after each successful call
pub struct Registry {
    api: ApiClient,
    customers: Vec<Customer>,
}

impl Registry {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            customers: Vec::new(),
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub async fn refresh(&mut self) -> Result<(), Alert> {
        self.customers = self.api.list().await.map_err(|e| {
            warn!(error = %e, "failed to load customers");
            Operation::Load.alert(&e)
        })?;
        debug!(count = self.customers.len(), "customers loaded");
        Ok(())
    }

    pub async fn add(&mut self, form: &CustomerForm) -> Result<CustomerId, Alert> {
        let input = form.to_input()?;
        let created = self.api.create(&input).await.map_err(|e| {
            warn!(error = %e, "failed to create customer");
            Operation::Create.alert(&e)
        })?;
        self.customers.push(Customer::new(created.insert_id, input));
        Ok(created.insert_id)
    }

    pub async fn edit(&mut self, id: CustomerId, form: &CustomerForm) -> Result<(), Alert> {
        let input = form.to_input().map_err(|_| EDIT_FIELDS_REQUIRED)?;
        self.api.update(id, &input).await.map_err(|e| {
            warn!(error = %e, %id, "failed to update customer");
            Operation::Update.alert(&e)
        })?;
        if let Some(customer) = self.customers.iter_mut().find(|c| c.id == id) {
            *customer = Customer::new(id, input);
        }
        Ok(())
    }

    pub async fn remove(&mut self, id: CustomerId) -> Result<(), Alert> {
        self.api.delete(id).await.map_err(|e| {
            warn!(error = %e, %id, "failed to delete customer");
            Operation::Delete.alert(&e)
        })?;
        self.customers.retain(|c| c.id != id);
        Ok(())
    }

    /// Case-insensitive match on name or state; blank text keeps everything.
    pub fn filter(&self, text: &str) -> Vec<&Customer> {
        let needle = text.to_lowercase();
        self.customers
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle) || c.state.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
