use serde::{Deserialize, Serialize};

use crate::models::campanha::StatusCampanha;

/// Contagem crua de registros de disparo por status, vinda de um único
/// GROUP BY em `disparo_leads`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContagemStatus {
    pub pendentes: i64,
    pub enviados: i64,
    pub falhas: i64,
}

impl ContagemStatus {
    pub fn total(&self) -> i64 {
        self.pendentes + self.enviados + self.falhas
    }
}

/// Situação categórica exibida junto da barra de progresso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituacaoProgresso {
    SemEnvios,
    EmAndamento,
    Concluido,
    ConcluidoComFalhas,
}

/// Agregado de progresso de uma campanha.
///
/// Fonte única: todas as superfícies (monitor e lista de disparos) consomem
/// este objeto, calculado por `ProgressoCampanha::calcular`. Não existem
/// contadores denormalizados paralelos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressoCampanha {
    pub total: i64,
    pub enviados: i64,
    pub falhas: i64,
    pub pendentes: i64,
    pub processados: i64,
    pub progresso_pct: i64,
    pub situacao: SituacaoProgresso,
}

impl ProgressoCampanha {
    /// Calcula o agregado a partir da contagem crua e do status da campanha.
    ///
    /// Quando a campanha está `concluido` ou `cancelado` e ainda existem
    /// registros `pendente`, eles são exibidos como falhas. Isso é política
    /// de apresentação: as linhas armazenadas não são alteradas. Campanha em
    /// `erro` fica de fora: ali os pendentes são retentáveis e precisam
    /// continuar visíveis.
    pub fn calcular(status: StatusCampanha, contagem: &ContagemStatus) -> Self {
        let total = contagem.total();
        let enviados = contagem.enviados;
        let mut falhas = contagem.falhas;
        let mut pendentes = contagem.pendentes;

        let encerrada = matches!(
            status,
            StatusCampanha::Concluido | StatusCampanha::Cancelado
        );
        if encerrada && pendentes > 0 {
            falhas += pendentes;
            pendentes = 0;
        }

        let processados = enviados + falhas;
        let progresso_pct = if total == 0 {
            0
        } else {
            ((processados as f64 / total as f64) * 100.0).round() as i64
        };

        let situacao = if total == 0 {
            SituacaoProgresso::SemEnvios
        } else if processados == total && falhas == 0 {
            SituacaoProgresso::Concluido
        } else if processados == total {
            SituacaoProgresso::ConcluidoComFalhas
        } else {
            SituacaoProgresso::EmAndamento
        };

        Self {
            total,
            enviados,
            falhas,
            pendentes,
            processados,
            progresso_pct,
            situacao,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campanha_sem_envios() {
        let progresso =
            ProgressoCampanha::calcular(StatusCampanha::EmAndamento, &ContagemStatus::default());

        assert_eq!(progresso.total, 0);
        assert_eq!(progresso.progresso_pct, 0);
        assert_eq!(progresso.situacao, SituacaoProgresso::SemEnvios);
    }

    #[test]
    fn test_processados_soma_enviados_e_falhas() {
        let contagem = ContagemStatus {
            pendentes: 3,
            enviados: 5,
            falhas: 2,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::EmAndamento, &contagem);

        assert_eq!(progresso.processados, 7);
        assert_eq!(progresso.total, 10);
        assert_eq!(progresso.progresso_pct, 70);
        assert_eq!(progresso.situacao, SituacaoProgresso::EmAndamento);
    }

    #[test]
    fn test_cem_por_cento_quando_sem_pendentes() {
        let contagem = ContagemStatus {
            pendentes: 0,
            enviados: 8,
            falhas: 1,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::EmAndamento, &contagem);

        assert_eq!(progresso.progresso_pct, 100);
        assert_eq!(progresso.situacao, SituacaoProgresso::ConcluidoComFalhas);
    }

    #[test]
    fn test_concluido_sem_falhas() {
        let contagem = ContagemStatus {
            pendentes: 0,
            enviados: 4,
            falhas: 0,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::Concluido, &contagem);

        assert_eq!(progresso.situacao, SituacaoProgresso::Concluido);
        assert_eq!(progresso.progresso_pct, 100);
    }

    #[test]
    fn test_reclassificacao_terminal_apenas_na_exibicao() {
        // Campanha encerrada com 3 pendentes: exibe como falhas, sem tocar
        // nas linhas armazenadas (a contagem de entrada permanece a mesma).
        let contagem = ContagemStatus {
            pendentes: 3,
            enviados: 7,
            falhas: 0,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::Concluido, &contagem);

        assert_eq!(progresso.falhas, 3);
        assert_eq!(progresso.pendentes, 0);
        assert_eq!(progresso.total, 10);
        assert_eq!(progresso.progresso_pct, 100);
        assert_eq!(contagem.pendentes, 3);
    }

    #[test]
    fn test_sem_reclassificacao_fora_de_estado_terminal() {
        let contagem = ContagemStatus {
            pendentes: 3,
            enviados: 7,
            falhas: 0,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::Pausado, &contagem);

        assert_eq!(progresso.falhas, 0);
        assert_eq!(progresso.pendentes, 3);
        assert_eq!(progresso.progresso_pct, 70);
    }

    #[test]
    fn test_reclassificacao_em_cancelado() {
        let contagem = ContagemStatus {
            pendentes: 2,
            enviados: 8,
            falhas: 0,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::Cancelado, &contagem);

        assert_eq!(progresso.falhas, 2);
        assert_eq!(progresso.pendentes, 0);
        assert_eq!(progresso.situacao, SituacaoProgresso::ConcluidoComFalhas);
    }

    #[test]
    fn test_erro_mantem_pendentes_visiveis() {
        // A compensação da criação marca `erro` deixando os registros
        // pendentes para retry manual; eles não podem virar falhas na
        // exibição nem sumir da barra.
        let contagem = ContagemStatus {
            pendentes: 3,
            enviados: 7,
            falhas: 0,
        };
        let progresso = ProgressoCampanha::calcular(StatusCampanha::Erro, &contagem);

        assert_eq!(progresso.pendentes, 3);
        assert_eq!(progresso.falhas, 0);
        assert_eq!(progresso.progresso_pct, 70);
        assert_eq!(progresso.situacao, SituacaoProgresso::EmAndamento);
    }

    #[test]
    fn test_arredondamento() {
        let contagem = ContagemStatus {
            pendentes: 2,
            enviados: 1,
            falhas: 0,
        };
        // 1/3 = 33.33% -> 33
        let progresso = ProgressoCampanha::calcular(StatusCampanha::EmAndamento, &contagem);
        assert_eq!(progresso.progresso_pct, 33);
    }
}
